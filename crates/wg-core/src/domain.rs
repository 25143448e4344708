//! Canonical domain extraction from raw locations and block-list entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A canonical tracked domain: lowercase hostname with any leading `www.`
/// stripped.
///
/// This is the key type for ledgers and the comparison unit for block
/// membership. Both ledger keys and block-list entries go through the same
/// canonicalization, so they are always comparable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Extracts the canonical domain from a full URL.
    ///
    /// Returns `None` for anything that is not trackable: empty input,
    /// strings that do not parse as URLs, non-http(s) schemes (browser
    /// pages like `chrome://`, extension pages, `about:` pages all fail the
    /// scheme check), and new-tab placeholders.
    ///
    /// Never panics; malformed input is simply not trackable.
    #[must_use]
    pub fn from_url(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains("newtab") {
            return None;
        }
        let parsed = url::Url::parse(raw).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        Self::canonicalize(parsed.host_str()?)
    }

    /// Canonicalizes a block-list entry.
    ///
    /// Entries are user input and may carry a scheme, a leading `www.`, or a
    /// trailing path; all are stripped before comparison.
    #[must_use]
    pub fn from_site_entry(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        let rest = entry
            .strip_prefix("https://")
            .or_else(|| entry.strip_prefix("http://"))
            .unwrap_or(entry);
        Self::canonicalize(rest.split('/').next().unwrap_or(""))
    }

    fn canonicalize(host: &str) -> Option<Self> {
        let lower = host.trim().to_ascii_lowercase();
        let stripped = lower.strip_prefix("www.").unwrap_or(&lower);
        if stripped.is_empty() {
            None
        } else {
            Some(Self(stripped.to_string()))
        }
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_url_strips_www_and_lowercases() {
        let domain = Domain::from_url("https://WWW.YouTube.com/watch?v=abc").unwrap();
        assert_eq!(domain.as_str(), "youtube.com");
    }

    #[test]
    fn from_url_keeps_subdomains() {
        let domain = Domain::from_url("https://music.youtube.com/").unwrap();
        assert_eq!(domain.as_str(), "music.youtube.com");
    }

    #[test]
    fn from_url_rejects_browser_internal_schemes() {
        assert!(Domain::from_url("chrome://settings").is_none());
        assert!(Domain::from_url("chrome-extension://abcdef/popup.html").is_none());
        assert!(Domain::from_url("about:blank").is_none());
        assert!(Domain::from_url("file:///etc/hosts").is_none());
    }

    #[test]
    fn from_url_rejects_new_tab_pages() {
        assert!(Domain::from_url("chrome://newtab/").is_none());
        assert!(Domain::from_url("https://browser.example/newtab").is_none());
    }

    #[test]
    fn from_url_rejects_garbage() {
        assert!(Domain::from_url("").is_none());
        assert!(Domain::from_url("   ").is_none());
        assert!(Domain::from_url("not a url").is_none());
        assert!(Domain::from_url("https://").is_none());
    }

    #[test]
    fn from_site_entry_cleans_user_input() {
        for entry in [
            "youtube.com",
            "www.youtube.com",
            "https://youtube.com",
            "https://www.youtube.com/feed",
            "  YouTube.com  ",
        ] {
            let domain = Domain::from_site_entry(entry).unwrap();
            assert_eq!(domain.as_str(), "youtube.com", "entry: {entry}");
        }
    }

    #[test]
    fn from_site_entry_rejects_empty() {
        assert!(Domain::from_site_entry("").is_none());
        assert!(Domain::from_site_entry("https://").is_none());
        assert!(Domain::from_site_entry("www.").is_none());
    }

    #[test]
    fn url_and_entry_normalization_agree() {
        let from_url = Domain::from_url("https://www.reddit.com/r/rust").unwrap();
        let from_entry = Domain::from_site_entry("www.reddit.com").unwrap();
        assert_eq!(from_url, from_entry);
    }

    #[test]
    fn serde_is_transparent() {
        let domain = Domain::from_url("https://example.com").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, "\"example.com\"");
        let parsed: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, domain);
    }
}
