//! The tagged event union consumed by the dispatcher.
//!
//! Every external signal (navigation, focus, idle changes, periodic ticks,
//! context closure, settings edits) arrives as one [`Event`] processed to
//! completion before the next, which removes the concurrency hazards of
//! independently registered callbacks. Events carry their own timestamps;
//! the core never reads the wall clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::afk::IdleStatus;
use crate::settings::Settings;

/// An external signal for the governor.
///
/// Serialized as JSONL with a snake_case `kind` tag; this is also the CLI
/// replay format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// An in-page navigation completed.
    Navigation {
        at: DateTime<Utc>,
        destination: String,
    },
    /// The focused tab or window changed. `None` means focus moved
    /// somewhere with no destination to track.
    FocusChanged {
        at: DateTime<Utc>,
        destination: Option<String>,
    },
    /// The platform idle detector changed state.
    IdleChanged { at: DateTime<Utc>, status: IdleStatus },
    /// Periodic commit/AFK-verification tick.
    Tick { at: DateTime<Utc> },
    /// The tracked viewing context closed.
    ContextClosed { at: DateTime<Utc> },
    /// The settings surface wrote a new configuration.
    ConfigChanged {
        at: DateTime<Utc>,
        settings: Settings,
    },
}

impl Event {
    /// The instant the event occurred.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Navigation { at, .. }
            | Self::FocusChanged { at, .. }
            | Self::IdleChanged { at, .. }
            | Self::Tick { at }
            | Self::ContextClosed { at }
            | Self::ConfigChanged { at, .. } => *at,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Navigation { .. } => "navigation",
            Self::FocusChanged { .. } => "focus_changed",
            Self::IdleChanged { .. } => "idle_changed",
            Self::Tick { .. } => "tick",
            Self::ContextClosed { .. } => "context_closed",
            Self::ConfigChanged { .. } => "config_changed",
        }
    }
}
