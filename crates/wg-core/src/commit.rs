//! The time-commit engine: applies a session's elapsed time to the ledgers
//! and, for blocked domains under active enforcement, to the budget.

use chrono::{DateTime, Utc};

use crate::domain::Domain;
use crate::session::Session;
use crate::settings::Settings;
use crate::state::RuntimeState;

/// What a successful commit changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// The domain that was charged.
    pub domain: Domain,
    /// Seconds committed.
    pub seconds: f64,
    /// Whether the domain is block-listed.
    pub blocked: bool,
}

/// Commits the elapsed time of `session` as of `now`.
///
/// Always credits the global ledger. For block-listed domains the blocked
/// ledger is credited too, and, only while enforcement is active, the
/// budget is decremented (never below zero) and the enforcement-visibility
/// flag recomputed. Tracking is independent of enforcing: with enforcement
/// off, ledgers still accumulate and the budget is untouched.
///
/// Returns `None` without touching anything when the elapsed time is zero,
/// negative, or not finite; clock skew or corrupted state must never charge
/// a ledger. This is a silent recoverable guard, not an error.
pub fn commit(
    now: DateTime<Utc>,
    session: &Session,
    settings: &mut Settings,
    state: &mut RuntimeState,
) -> Option<CommitOutcome> {
    let delta = session.elapsed_seconds(now);
    if !delta.is_finite() || delta <= 0.0 {
        tracing::trace!(delta, site = %session.site, "skipping non-positive commit");
        return None;
    }

    state.global_ledger.add(&session.site, delta);

    let blocked = settings.is_blocked(&session.site);
    if blocked {
        state.blocked_ledger.add(&session.site, delta);
        if settings.enforcement_active {
            settings.budget_seconds = (settings.budget_seconds - delta).max(0.0);
            state.enforcement_visible = settings.budget_seconds <= 0.0;
            tracing::debug!(
                seconds = delta,
                remaining = settings.budget_seconds,
                site = %session.site,
                "budget charged"
            );
        }
    }

    tracing::debug!(seconds = delta, site = %session.site, blocked, "time committed");
    Some(CommitOutcome {
        domain: session.site.clone(),
        seconds: delta,
        blocked,
    })
}
