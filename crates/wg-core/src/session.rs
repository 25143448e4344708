//! The open viewing session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// Fractional seconds between two instants.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond spans fit f64 exactly for practical durations"
)]
pub(crate) fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

/// One continuous interval where a specific domain is the active viewing
/// context.
///
/// The site and the start time exist together or not at all; an absent
/// session is simply `None`, so the paired-field invariant holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The canonical domain being viewed.
    pub site: Domain,
    /// When this interval started.
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session for `site` starting at `at`.
    #[must_use]
    pub const fn open(site: Domain, at: DateTime<Utc>) -> Self {
        Self {
            site,
            started_at: at,
        }
    }

    /// Seconds elapsed since the session opened. May be zero or negative if
    /// the clock moved; callers must guard before charging ledgers.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        seconds_between(self.started_at, now)
    }
}
