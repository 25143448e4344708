//! Day rollover: archives the live ledgers into a 7-slot weekly history.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::state::RuntimeState;

/// Weekday names used as archive keys, Monday first.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Archive slot name for a weekday index (0 = Monday).
#[must_use]
pub fn day_name(index: u32) -> &'static str {
    DAY_NAMES[(index % 7) as usize]
}

/// The weekly history: one optional ledger snapshot per weekday.
///
/// `None` in a slot marks a day the device never saw (asleep, powered off).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayArchive {
    /// Weekday index (0 = Monday) of the day the live ledgers belong to.
    /// `None` until the first rollover check runs.
    #[serde(default)]
    pub current_day: Option<u32>,
    /// Per-day snapshots of the global ledger.
    #[serde(default)]
    pub global_days: BTreeMap<String, Option<Ledger>>,
    /// Per-day snapshots of the blocked ledger.
    #[serde(default)]
    pub blocked_days: BTreeMap<String, Option<Ledger>>,
}

/// Rolls the archive forward if the calendar day changed.
///
/// On the first ever check this only records today; there is nothing to
/// archive yet. On a day change the live ledgers are archived under the
/// stored day's name, every skipped day in between gets a `null` slot, and
/// the live ledgers reset. Same-day checks are no-ops, so calling this on
/// every tick is safe.
///
/// Returns true when a rollover happened.
pub fn check_day(state: &mut RuntimeState, today: Weekday) -> bool {
    let today_index = today.num_days_from_monday();
    let Some(current) = state.archive.current_day else {
        state.archive.current_day = Some(today_index);
        return false;
    };
    if current == today_index {
        return false;
    }

    let archived = day_name(current);
    state
        .archive
        .global_days
        .insert(archived.to_string(), Some(state.global_ledger.clone()));
    state
        .archive
        .blocked_days
        .insert(archived.to_string(), Some(state.blocked_ledger.clone()));

    // Fill every weekday strictly between the stored day and today; the
    // device was away for those.
    let mut day = (current + 1) % 7;
    while day != today_index {
        state
            .archive
            .global_days
            .insert(day_name(day).to_string(), None);
        state
            .archive
            .blocked_days
            .insert(day_name(day).to_string(), None);
        day = (day + 1) % 7;
    }

    state.archive.current_day = Some(today_index);
    state.global_ledger.clear();
    state.blocked_ledger.clear();
    tracing::info!(archived, today = day_name(today_index), "day rolled over");
    true
}
