//! Synced user configuration: written by the settings surface, read by the
//! core. The core treats every change as an event (see [`crate::Event`]).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Domain;

/// The configured response once the budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementAction {
    /// Hard redirect away from the blocked site.
    #[default]
    Block,
    /// Show a warning overlay but keep the page.
    Warn,
    /// Track only; take no action.
    Disable,
}

impl EnforcementAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Warn => "warn",
            Self::Disable => "disable",
        }
    }

    /// Maps the configured action to the signal surfaced to the overlay
    /// collaborator. Pure table, no further state.
    #[must_use]
    pub const fn decision(self) -> EnforcementDecision {
        match self {
            Self::Block => EnforcementDecision::Redirect,
            Self::Warn => EnforcementDecision::Warn,
            Self::Disable => EnforcementDecision::Allow,
        }
    }
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnforcementAction {
    type Err = InvalidEnforcementAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "warn" => Ok(Self::Warn),
            "disable" => Ok(Self::Disable),
            _ => Err(InvalidEnforcementAction(s.to_string())),
        }
    }
}

/// Error type for unrecognized enforcement action strings.
#[derive(Debug, Clone, Error)]
#[error("invalid enforcement action: {0} (expected block, warn, or disable)")]
pub struct InvalidEnforcementAction(String);

/// What the overlay/redirect collaborator should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementDecision {
    /// Budget exhausted, action is Block: signal a hard redirect.
    Redirect,
    /// Budget exhausted, action is Warn: signal the warning overlay.
    Warn,
    /// No enforcement applies.
    Allow,
}

impl EnforcementDecision {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Warn => "warn",
            Self::Allow => "allow",
        }
    }
}

impl fmt::Display for EnforcementDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the user's block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Opaque identifier assigned by the settings surface.
    pub id: String,
    /// The site as the user entered it; canonicalized on comparison.
    pub domain: String,
}

/// The full synced configuration.
///
/// A store with no settings record means "not yet configured" and the
/// governor treats every event as if it were disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Master switch; off means no session bookkeeping at all.
    pub global_switch: bool,
    /// Whether blocked-site time is charged against the budget.
    pub enforcement_active: bool,
    /// Response once the budget reaches zero.
    pub action: EnforcementAction,
    /// The user's blocked sites, in display order.
    pub block_list: Vec<BlockEntry>,
    /// Remaining seconds of allowed blocked-site usage today.
    pub budget_seconds: f64,
    /// Idle seconds before the user counts as genuinely away.
    pub afk_threshold_seconds: f64,
    /// Whether AFK detection runs at all.
    pub afk_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_switch: true,
            enforcement_active: false,
            action: EnforcementAction::Block,
            block_list: Vec::new(),
            budget_seconds: 1800.0,
            afk_threshold_seconds: 300.0,
            afk_enabled: true,
        }
    }
}

impl Settings {
    /// Block-membership oracle: true iff an entry canonicalizes to `domain`.
    #[must_use]
    pub fn is_blocked(&self, domain: &Domain) -> bool {
        self.block_list
            .iter()
            .any(|entry| Domain::from_site_entry(&entry.domain).as_ref() == Some(domain))
    }

    /// Canonical domains present in `self`'s block list but absent from
    /// `newer`'s. Used to prune stale blocked-ledger entries on edits.
    #[must_use]
    pub fn removed_domains(&self, newer: &Self) -> Vec<Domain> {
        let kept: BTreeSet<Domain> = newer
            .block_list
            .iter()
            .filter_map(|entry| Domain::from_site_entry(&entry.domain))
            .collect();
        let mut removed: Vec<Domain> = self
            .block_list
            .iter()
            .filter_map(|entry| Domain::from_site_entry(&entry.domain))
            .filter(|domain| !kept.contains(domain))
            .collect();
        removed.dedup();
        removed
    }
}
