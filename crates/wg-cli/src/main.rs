use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wg_cli::commands::{init, report, run, set, sites, status};
use wg_cli::{Cli, Commands, Config, SitesAction};
use wg_store::SqliteStore;

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(SqliteStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.store_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create store directory")?;
    }

    let store = SqliteStore::open(&config.store_path).context("failed to open store")?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init avoids a panic if tracing is already initialized in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout();
    match &cli.command {
        Some(Commands::Init) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            init::run(&mut stdout, store, &config.store_path)?;
        }
        Some(Commands::Run { events }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            match events.as_deref() {
                Some(path) if path != Path::new("-") => {
                    let file = File::open(path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    run::run(&mut stdout, store, BufReader::new(file))?;
                }
                _ => {
                    let stdin = io::stdin();
                    run::run(&mut stdout, store, stdin.lock())?;
                }
            }
        }
        Some(Commands::Status) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            status::run(&mut stdout, &store, &config.store_path)?;
        }
        Some(Commands::Report { json }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            report::run(&mut stdout, &store, *json)?;
        }
        Some(Commands::Sites { action }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            match action {
                SitesAction::List => sites::list(&mut stdout, &store)?,
                SitesAction::Add { site } => sites::add(&mut stdout, store, site)?,
                SitesAction::Remove { site } => sites::remove(&mut stdout, store, site)?,
            }
        }
        Some(Commands::Set { setting }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            set::run(&mut stdout, store, setting)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
