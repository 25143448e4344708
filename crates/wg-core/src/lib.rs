//! Core logic for the web-usage governor.
//!
//! This crate contains the fundamental types and logic for:
//! - Domain canonicalization and block membership
//! - The session/commit bookkeeping that turns viewing time into ledgers
//! - AFK detection with a settle window on return
//! - The 7-day rollover archive
//! - The event dispatcher tying it all together over a pluggable store

pub mod afk;
pub mod commit;
pub mod domain;
pub mod engine;
pub mod event;
pub mod ledger;
pub mod rollover;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;

pub use afk::{AfkPhase, IdleState, IdleStatus, RETURN_SETTLE_SECONDS};
pub use commit::{CommitOutcome, commit};
pub use domain::Domain;
pub use engine::Governor;
pub use event::Event;
pub use ledger::Ledger;
pub use rollover::{DAY_NAMES, DayArchive, day_name};
pub use session::Session;
pub use settings::{
    BlockEntry, EnforcementAction, EnforcementDecision, InvalidEnforcementAction, Settings,
};
pub use state::RuntimeState;
pub use store::{MemoryStore, STORE_SCHEMA_VERSION, StateStore, StoreError};
