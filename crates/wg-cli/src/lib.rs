//! Web governor CLI library.
//!
//! This crate provides the CLI interface for the web-usage governor.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, SetAction, SitesAction};
pub use config::Config;
