//! Settings edits, applied through the governor's change reactor.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::Utc;

use wg_core::{Event, Governor, StateStore};

use crate::cli::SetAction;

use super::util::format_seconds;

pub fn run<W: Write, S: StateStore>(writer: &mut W, store: S, setting: &SetAction) -> Result<()> {
    let mut settings = store.load_settings()?.unwrap_or_default();

    let confirmation = match setting {
        SetAction::Budget { seconds } => {
            if !seconds.is_finite() || *seconds < 0.0 {
                bail!("budget must be a non-negative number of seconds");
            }
            settings.budget_seconds = *seconds;
            format!("Budget set to {}", format_seconds(*seconds))
        }
        SetAction::Action { action } => {
            settings.action = *action;
            format!("Enforcement action set to {action}")
        }
        SetAction::AfkThreshold { seconds } => {
            if !seconds.is_finite() || *seconds <= 0.0 {
                bail!("away threshold must be a positive number of seconds");
            }
            settings.afk_threshold_seconds = *seconds;
            format!("Away threshold set to {}", format_seconds(*seconds))
        }
        SetAction::Afk { enabled } => {
            settings.afk_enabled = *enabled;
            format!("Away detection {}", on_off(*enabled))
        }
        SetAction::Enforcement { enabled } => {
            settings.enforcement_active = *enabled;
            format!("Enforcement {}", on_off(*enabled))
        }
        SetAction::Global { enabled } => {
            settings.global_switch = *enabled;
            format!("Tracking {}", on_off(*enabled))
        }
    };

    let mut governor = Governor::new(store);
    governor.handle_event(&Event::ConfigChanged {
        at: Utc::now(),
        settings,
    });
    writeln!(writer, "{confirmation}")?;
    Ok(())
}

const fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
