//! AFK detection: decides when the user is genuinely away.
//!
//! A single idle signal is not trustworthy evidence of either departure or
//! return: the platform's idle detector fires on brief distractions too. So
//! both directions are gated: departure by a time threshold, return by a
//! settle window. Four phases:
//!
//! `Active` → `IdlePending` (idle signal) → `AfkReached` (threshold crossed
//! on a tick; commits suspend) → `PendingReturn` (activity signal; a settle
//! window runs) → `Active` (window passes with no new idle signal).
//!
//! The machine is pure state plus transitions; the dispatcher applies the
//! returned effects (final commit, session reopen).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::seconds_between;

/// Seconds an activity signal must go unchallenged before a return is
/// trusted.
pub const RETURN_SETTLE_SECONDS: f64 = 30.0;

/// The platform idle detector's signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleStatus {
    Idle,
    Active,
}

/// Phase of the AFK machine, derived from [`IdleState`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfkPhase {
    /// No idle bookkeeping running.
    Active,
    /// Idle time is being counted but the threshold is not yet reached.
    IdlePending,
    /// The user is genuinely away; commits are suspended.
    AfkReached,
    /// An activity signal arrived; waiting out the settle window.
    PendingReturn,
}

impl AfkPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::IdlePending => "idle_pending",
            Self::AfkReached => "afk_reached",
            Self::PendingReturn => "pending_return",
        }
    }
}

/// What a periodic tick asked the dispatcher to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfkTick {
    /// No idle-related change.
    None,
    /// Idle time crossed the threshold: commit the open session up to this
    /// instant, then suspend further commits.
    ThresholdReached,
    /// The settle window elapsed without a new idle signal: clear all flags
    /// and resume tracking the current context.
    ReturnConfirmed,
}

/// Persisted idle bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdleState {
    /// When the current idle stretch started. Cleared once AFK is reached
    /// or an activity signal arrives.
    #[serde(default)]
    pub idle_start: Option<DateTime<Utc>>,
    /// The user is genuinely away; only a confirmed return clears this.
    #[serde(default)]
    pub afk_reached: bool,
    /// Decrementing seconds-to-AFK counter, for display only. The
    /// authoritative threshold test always uses `now - idle_start`.
    #[serde(default)]
    pub countdown_seconds: Option<f64>,
    /// An activity signal arrived and the settle window is running.
    #[serde(default)]
    pub pending_return: bool,
    /// When the settle window started.
    #[serde(default)]
    pub return_check_at: Option<DateTime<Utc>>,
}

impl IdleState {
    #[must_use]
    pub const fn phase(&self) -> AfkPhase {
        if self.pending_return {
            AfkPhase::PendingReturn
        } else if self.afk_reached {
            AfkPhase::AfkReached
        } else if self.idle_start.is_some() {
            AfkPhase::IdlePending
        } else {
            AfkPhase::Active
        }
    }

    /// True while no time may be committed for the open session.
    #[must_use]
    pub const fn commits_suspended(&self) -> bool {
        self.afk_reached
    }

    /// Handles an idle signal from the platform.
    ///
    /// A new idle signal always wins over a pending return, and a false
    /// return never clears `afk_reached`.
    pub fn on_idle_signal(&mut self, now: DateTime<Utc>) {
        if self.pending_return {
            // The user did not genuinely come back; resume idle accounting
            // immediately instead of waiting out the window.
            self.pending_return = false;
            self.return_check_at = None;
            if !self.afk_reached {
                self.idle_start = Some(now);
            }
            tracing::debug!(afk_reached = self.afk_reached, "pending return cancelled by idle signal");
            return;
        }
        if self.afk_reached {
            // Brief unconfirmed return, then idle again: restart idle
            // accounting from scratch.
            self.afk_reached = false;
            self.countdown_seconds = None;
            self.idle_start = Some(now);
            tracing::debug!("idle accounting restarted after unconfirmed return");
            return;
        }
        if self.idle_start.is_none() {
            self.idle_start = Some(now);
            tracing::debug!("idle stretch started");
        }
        // An idle signal while idle tracking already runs is a no-op.
    }

    /// Handles an activity signal from the platform.
    ///
    /// Starts the settle window; `afk_reached` is kept until the return is
    /// confirmed.
    pub fn on_activity_signal(&mut self, now: DateTime<Utc>) {
        if self.idle_start.is_some() || self.afk_reached {
            self.pending_return = true;
            self.return_check_at = Some(now);
            self.idle_start = None;
            self.countdown_seconds = None;
            tracing::debug!("activity signal; settle window started");
        }
    }

    /// Advances the machine on a periodic tick.
    pub fn on_tick(&mut self, now: DateTime<Utc>, threshold_seconds: f64) -> AfkTick {
        if self.pending_return {
            if let Some(checked_at) = self.return_check_at {
                if seconds_between(checked_at, now) >= RETURN_SETTLE_SECONDS {
                    self.clear();
                    return AfkTick::ReturnConfirmed;
                }
            }
            return AfkTick::None;
        }
        if let Some(start) = self.idle_start {
            let elapsed = seconds_between(start, now);
            if elapsed >= threshold_seconds {
                self.afk_reached = true;
                self.idle_start = None;
                self.countdown_seconds = None;
                return AfkTick::ThresholdReached;
            }
            // Below threshold: idle is not yet AFK. Keep the display counter
            // current; control decisions never read it.
            self.countdown_seconds = Some(threshold_seconds - elapsed);
        }
        AfkTick::None
    }

    /// Resets all idle/AFK bookkeeping.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
