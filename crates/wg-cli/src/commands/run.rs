//! Run command: replays a JSONL event feed through the governor.
//!
//! Each input line is one event; the resulting enforcement decision is
//! printed per event. Malformed lines are skipped with a warning so a feed
//! with a few bad records still replays.

use std::io::{BufRead, Write};

use anyhow::Result;

use wg_core::{Event, Governor, StateStore};

pub fn run<W: Write, S: StateStore>(
    writer: &mut W,
    store: S,
    reader: impl BufRead,
) -> Result<()> {
    let mut governor = Governor::new(store);
    let mut processed = 0_usize;
    let mut malformed = 0_usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Event>(line) {
            Ok(event) => {
                let decision = governor.handle_event(&event);
                writeln!(writer, "{} {}", event.reason(), decision)?;
                processed += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed event line");
                malformed += 1;
            }
        }
    }

    tracing::info!(processed, malformed, "replay finished");
    Ok(())
}
