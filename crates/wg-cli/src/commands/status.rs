//! Status command for showing the governor's current state.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::SecondsFormat;

use wg_core::StateStore;

use super::util::format_seconds;

pub fn run<W: Write, S: StateStore>(writer: &mut W, store: &S, store_path: &Path) -> Result<()> {
    let settings = store.load_settings()?;
    let state = store.load_runtime()?;

    writeln!(writer, "Web governor status")?;
    writeln!(writer, "Store: {}", store_path.display())?;

    let Some(settings) = settings else {
        writeln!(writer, "Not configured. Run `wg init` first.")?;
        return Ok(());
    };

    writeln!(
        writer,
        "Tracking: {}",
        if settings.global_switch { "on" } else { "off" }
    )?;
    writeln!(
        writer,
        "Enforcement: {} ({})",
        if settings.enforcement_active { "on" } else { "off" },
        settings.action
    )?;
    writeln!(
        writer,
        "Budget remaining: {}",
        format_seconds(settings.budget_seconds)
    )?;
    if state.enforcement_visible {
        writeln!(writer, "Overlay: visible ({})", settings.action.decision())?;
    } else {
        writeln!(writer, "Overlay: hidden")?;
    }
    writeln!(
        writer,
        "Away detection: {} ({} threshold, currently {})",
        if settings.afk_enabled { "on" } else { "off" },
        format_seconds(settings.afk_threshold_seconds),
        state.idle.phase().as_str()
    )?;

    match &state.session {
        Some(session) => writeln!(
            writer,
            "Session: {} since {}",
            session.site,
            session
                .started_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        )?,
        None => writeln!(writer, "Session: none")?,
    }

    writeln!(
        writer,
        "Today: {} tracked, {} on blocked sites",
        format_seconds(state.global_ledger.total_seconds()),
        format_seconds(state.blocked_ledger.total_seconds())
    )?;

    Ok(())
}
