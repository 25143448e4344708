//! SQLite-backed storage for the governor.
//!
//! Both durability classes live in one `records` table keyed by
//! `(namespace, key)`: the synced settings under `sync/settings` and the
//! device-local runtime state under `local/runtime`. Values are JSON text,
//! timestamps ISO 8601 UTC.
//!
//! # Thread Safety
//!
//! [`SqliteStore`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Move it between threads or guard it with a `Mutex`; the governor
//! itself is a single actor and needs neither.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use wg_core::{RuntimeState, STORE_SCHEMA_VERSION, Settings, StateStore, StoreError};

const NS_SYNC: &str = "sync";
const NS_LOCAL: &str = "local";
const KEY_SETTINGS: &str = "settings";
const KEY_RUNTIME: &str = "runtime";

/// SQLite connection wrapper implementing [`StateStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens a store at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open and the call is idempotent.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        let store = Self { conn };
        store.init()?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(store)
    }

    /// Opens an in-memory store, destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS records (
                    namespace TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    PRIMARY KEY (namespace, key)
                );
                ",
            )
            .map_err(StoreError::backend)?;
        self.conn
            .pragma_update(None, "user_version", STORE_SCHEMA_VERSION)
            .map_err(StoreError::backend)?;
        Ok(())
    }

    /// The schema version recorded in the database.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        self.conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(StoreError::backend)
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM records WHERE namespace = ? AND key = ?",
                params![namespace, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn
            .execute(
                "
                INSERT INTO records (namespace, key, value, updated_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(namespace, key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
                params![namespace, key, value, updated_at],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        match self.read(NS_SYNC, KEY_SETTINGS)? {
            Some(value) => {
                let settings = serde_json::from_str(&value).map_err(|source| {
                    StoreError::Corrupt {
                        record: "settings",
                        source,
                    }
                })?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let value = serde_json::to_string(settings).map_err(|source| StoreError::Corrupt {
            record: "settings",
            source,
        })?;
        self.write(NS_SYNC, KEY_SETTINGS, &value)
    }

    fn load_runtime(&self) -> Result<RuntimeState, StoreError> {
        match self.read(NS_LOCAL, KEY_RUNTIME)? {
            Some(value) => serde_json::from_str(&value).map_err(|source| StoreError::Corrupt {
                record: "runtime",
                source,
            }),
            None => Ok(RuntimeState::default()),
        }
    }

    fn save_runtime(&mut self, state: &RuntimeState) -> Result<(), StoreError> {
        let value = serde_json::to_string(state).map_err(|source| StoreError::Corrupt {
            record: "runtime",
            source,
        })?;
        self.write(NS_LOCAL, KEY_RUNTIME, &value)
    }

    /// Writes both records inside one transaction so a crash never leaves
    /// the settings and the runtime state from different events.
    fn save_all(&mut self, settings: &Settings, state: &RuntimeState) -> Result<(), StoreError> {
        let settings_value =
            serde_json::to_string(settings).map_err(|source| StoreError::Corrupt {
                record: "settings",
                source,
            })?;
        let state_value = serde_json::to_string(state).map_err(|source| StoreError::Corrupt {
            record: "runtime",
            source,
        })?;
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        {
            let mut stmt = tx
                .prepare(
                    "
                    INSERT INTO records (namespace, key, value, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(namespace, key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at
                    ",
                )
                .map_err(StoreError::backend)?;
            stmt.execute(params![NS_SYNC, KEY_SETTINGS, settings_value, updated_at])
                .map_err(StoreError::backend)?;
            stmt.execute(params![NS_LOCAL, KEY_RUNTIME, state_value, updated_at])
                .map_err(StoreError::backend)?;
        }
        tx.commit().map_err(StoreError::backend)
    }
}
