//! Device-local runtime state: the `local` durability class.

use serde::{Deserialize, Serialize};

use crate::afk::IdleState;
use crate::ledger::Ledger;
use crate::rollover::DayArchive;
use crate::session::Session;

/// Everything the governor persists per device.
///
/// All fields default to their empty state, so a store with no runtime
/// record behaves like a fresh install.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    /// The open viewing session, if any. At most one exists at any instant.
    #[serde(default)]
    pub session: Option<Session>,
    /// Seconds accumulated per domain today, all tracked sites.
    #[serde(default)]
    pub global_ledger: Ledger,
    /// Seconds accumulated per domain today, block-listed sites only.
    #[serde(default)]
    pub blocked_ledger: Ledger,
    /// True exactly while the budget is exhausted and enforcement is active.
    /// Read by the overlay collaborator.
    #[serde(default)]
    pub enforcement_visible: bool,
    /// AFK bookkeeping.
    #[serde(default)]
    pub idle: IdleState,
    /// The 7-day ledger history.
    #[serde(default)]
    pub archive: DayArchive,
    /// The most recent raw destination seen, trackable or not. Lets the
    /// settings reactor and the AFK return path re-evaluate the current
    /// context without querying a live browser.
    #[serde(default)]
    pub last_context: Option<String>,
}
