//! CLI subcommand implementations.

pub mod init;
pub mod report;
pub mod run;
pub mod set;
pub mod sites;
pub mod status;
pub mod util;
