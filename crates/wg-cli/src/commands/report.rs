//! Report command for per-domain time, today and across the past week.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use wg_core::{DAY_NAMES, Ledger, StateStore, day_name};

use super::util::format_seconds;

/// One archived day. `None` ledgers mean the device never saw that day.
#[derive(Debug, Serialize)]
struct DayReport {
    day: &'static str,
    tracked: Option<Ledger>,
    blocked: Option<Ledger>,
}

/// The full report payload for `--json`.
#[derive(Debug, Serialize)]
struct ReportData {
    current_day: Option<&'static str>,
    today_tracked: Ledger,
    today_blocked: Ledger,
    week: Vec<DayReport>,
}

pub fn run<W: Write, S: StateStore>(writer: &mut W, store: &S, json: bool) -> Result<()> {
    let state = store.load_runtime()?;

    let week = DAY_NAMES
        .iter()
        .map(|&day| DayReport {
            day,
            tracked: state.archive.global_days.get(day).cloned().flatten(),
            blocked: state.archive.blocked_days.get(day).cloned().flatten(),
        })
        .collect();
    let data = ReportData {
        current_day: state.archive.current_day.map(day_name),
        today_tracked: state.global_ledger.clone(),
        today_blocked: state.blocked_ledger.clone(),
        week,
    };

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
        return Ok(());
    }

    match data.current_day {
        Some(day) => writeln!(writer, "Today ({day}):")?,
        None => writeln!(writer, "Today:")?,
    }
    if data.today_tracked.is_empty() {
        writeln!(writer, "- nothing tracked yet")?;
    }
    for (domain, seconds) in data.today_tracked.iter() {
        let blocked_note = if data.today_blocked.iter().any(|(d, _)| d == domain) {
            " [blocked]"
        } else {
            ""
        };
        writeln!(writer, "- {domain}: {}{blocked_note}", format_seconds(seconds))?;
    }

    writeln!(writer, "Past week:")?;
    for day in &data.week {
        match &day.tracked {
            Some(tracked) => {
                let blocked_total = day
                    .blocked
                    .as_ref()
                    .map_or(0.0, Ledger::total_seconds);
                writeln!(
                    writer,
                    "- {}: {} tracked, {} blocked",
                    day.day,
                    format_seconds(tracked.total_seconds()),
                    format_seconds(blocked_total)
                )?;
            }
            None => writeln!(writer, "- {}: no data", day.day)?,
        }
    }

    Ok(())
}
