//! The persistence seam.
//!
//! The governor is generic over a [`StateStore`]; the core crate ships only
//! an in-memory implementation for tests, the real backend lives in the
//! store crate. Two durability classes map to two records: settings (synced
//! across devices) and runtime state (device-local).

use thiserror::Error;

use crate::settings::Settings;
use crate::state::RuntimeState;

/// Bumped whenever a persisted record's shape changes incompatibly.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend itself failed (I/O, database).
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A persisted record could not be decoded.
    #[error("corrupt {record} record")]
    Corrupt {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Wraps an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Durable storage for the governor's two records.
pub trait StateStore {
    /// Loads the synced settings; `None` means never configured.
    fn load_settings(&self) -> Result<Option<Settings>, StoreError>;

    /// Persists the synced settings.
    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError>;

    /// Loads the device-local runtime state; a missing record is a fresh
    /// default, not an error.
    fn load_runtime(&self) -> Result<RuntimeState, StoreError>;

    /// Persists the device-local runtime state.
    fn save_runtime(&mut self, state: &RuntimeState) -> Result<(), StoreError>;

    /// Persists both records. Backends with transactions should override
    /// this to make the pair atomic.
    fn save_all(&mut self, settings: &Settings, state: &RuntimeState) -> Result<(), StoreError> {
        self.save_settings(settings)?;
        self.save_runtime(state)
    }
}

impl<S: StateStore> StateStore for &mut S {
    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        (**self).load_settings()
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        (**self).save_settings(settings)
    }

    fn load_runtime(&self) -> Result<RuntimeState, StoreError> {
        (**self).load_runtime()
    }

    fn save_runtime(&mut self, state: &RuntimeState) -> Result<(), StoreError> {
        (**self).save_runtime(state)
    }

    fn save_all(&mut self, settings: &Settings, state: &RuntimeState) -> Result<(), StoreError> {
        (**self).save_all(settings, state)
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    settings: Option<Settings>,
    runtime: RuntimeState,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `settings`, as if configured earlier.
    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
            runtime: RuntimeState::default(),
        }
    }
}

impl StateStore for MemoryStore {
    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        Ok(self.settings.clone())
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn load_runtime(&self) -> Result<RuntimeState, StoreError> {
        Ok(self.runtime.clone())
    }

    fn save_runtime(&mut self, state: &RuntimeState) -> Result<(), StoreError> {
        self.runtime = state.clone();
        Ok(())
    }
}
