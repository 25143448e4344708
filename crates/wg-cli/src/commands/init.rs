//! Init command for creating the store and seeding default settings.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use wg_core::{Event, Governor, Settings, StateStore};

pub fn run<W: Write, S: StateStore>(writer: &mut W, store: S, store_path: &Path) -> Result<()> {
    let already_configured = store.load_settings()?.is_some();
    if already_configured {
        writeln!(writer, "Store:    {}", store_path.display())?;
        writeln!(writer, "Settings: already configured")?;
        return Ok(());
    }

    let mut governor = Governor::new(store);
    governor.handle_event(&Event::ConfigChanged {
        at: Utc::now(),
        settings: Settings::default(),
    });

    writeln!(writer, "Store:    {}", store_path.display())?;
    writeln!(writer, "Settings: seeded defaults")?;
    Ok(())
}
