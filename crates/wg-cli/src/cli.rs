//! Command-line argument definitions.

use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};

use wg_core::EnforcementAction;

/// Personal web-usage governor.
///
/// Tracks per-domain viewing time from an event feed, charges block-listed
/// sites against a daily budget, and reports what an enforcement overlay
/// should do.
#[derive(Debug, Parser)]
#[command(name = "wg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the store and seed default settings.
    Init,

    /// Replay a JSONL event feed through the governor.
    Run {
        /// Events file; `-` or omitted reads stdin.
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Show current tracking status.
    Status,

    /// Report per-domain time for today and the past week.
    Report {
        /// Output JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Manage the block list.
    Sites {
        #[command(subcommand)]
        action: SitesAction,
    },

    /// Change a setting.
    Set {
        #[command(subcommand)]
        setting: SetAction,
    },
}

/// Block-list operations.
#[derive(Debug, Subcommand)]
pub enum SitesAction {
    /// List block-list entries.
    List,
    /// Add a site to the block list.
    Add {
        /// The site, e.g. `youtube.com` or a full URL.
        site: String,
    },
    /// Remove a site from the block list.
    Remove {
        /// The site as listed, or its entry ID.
        site: String,
    },
}

/// Individual settings.
#[derive(Debug, Subcommand)]
pub enum SetAction {
    /// Daily budget for block-listed sites, in seconds.
    Budget { seconds: f64 },
    /// Response once the budget is exhausted: block, warn, or disable.
    Action {
        #[arg(value_parser = EnforcementAction::from_str)]
        action: EnforcementAction,
    },
    /// Idle seconds before the user counts as away.
    AfkThreshold { seconds: f64 },
    /// Turn AFK detection on or off.
    Afk {
        // A bare `bool` positional defaults to ArgAction::SetTrue, which
        // cannot take a value; the action must be Set.
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
    /// Turn budget enforcement on or off.
    Enforcement {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
    /// Master switch for all tracking.
    Global {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
}
