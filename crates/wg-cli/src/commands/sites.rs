//! Block-list management.
//!
//! Edits are routed through the governor as configuration-change events so
//! the settings reactor runs: the open session is settled and stale
//! blocked-ledger entries are pruned exactly as if the settings surface had
//! written the change.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::Utc;

use wg_core::{BlockEntry, Domain, Event, Governor, StateStore};

pub fn list<W: Write, S: StateStore>(writer: &mut W, store: &S) -> Result<()> {
    let Some(settings) = store.load_settings()? else {
        writeln!(writer, "Not configured. Run `wg init` first.")?;
        return Ok(());
    };
    if settings.block_list.is_empty() {
        writeln!(writer, "Block list is empty.")?;
        return Ok(());
    }
    for entry in &settings.block_list {
        writeln!(writer, "- {} (id {})", entry.domain, entry.id)?;
    }
    Ok(())
}

pub fn add<W: Write, S: StateStore>(writer: &mut W, store: S, site: &str) -> Result<()> {
    let Some(domain) = Domain::from_site_entry(site) else {
        bail!("not a valid site: {site}");
    };

    let mut settings = store.load_settings()?.unwrap_or_default();
    if settings.is_blocked(&domain) {
        writeln!(writer, "{domain} is already on the block list")?;
        return Ok(());
    }
    settings.block_list.push(BlockEntry {
        id: Utc::now().timestamp_millis().to_string(),
        domain: site.trim().to_string(),
    });

    let mut governor = Governor::new(store);
    governor.handle_event(&Event::ConfigChanged {
        at: Utc::now(),
        settings,
    });
    writeln!(writer, "Added {domain}")?;
    Ok(())
}

pub fn remove<W: Write, S: StateStore>(writer: &mut W, store: S, site: &str) -> Result<()> {
    let Some(mut settings) = store.load_settings()? else {
        bail!("not configured; run `wg init` first");
    };

    let target = Domain::from_site_entry(site);
    let before = settings.block_list.len();
    settings.block_list.retain(|entry| {
        if entry.id == site {
            return false;
        }
        // An argument that does not canonicalize can only match by id;
        // it must never pair with an entry whose domain is equally
        // unparseable.
        match (&target, Domain::from_site_entry(&entry.domain)) {
            (Some(wanted), Some(stored)) => stored != *wanted,
            _ => true,
        }
    });
    if settings.block_list.len() == before {
        bail!("no block-list entry matches {site}");
    }

    let mut governor = Governor::new(store);
    governor.handle_event(&Event::ConfigChanged {
        at: Utc::now(),
        settings,
    });
    writeln!(writer, "Removed {site}")?;
    Ok(())
}
