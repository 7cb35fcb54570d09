//! Durable key-value store for the session state mirror.
//!
//! The store is a mirror, not a second writer: the coordinator owns the
//! in-memory state and writes through after each mutation. A store failure
//! is never fatal -- callers log and continue in memory.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{CoreError, StoreError};

/// The fixed set of persisted keys.
pub mod keys {
    pub const TIMER_STATE: &str = "timerState";
    pub const COMPLETED_SESSIONS: &str = "completedSessions";
    pub const BLOCKED_SITES: &str = "blockedSites";
    pub const FOCUS_TIME: &str = "focusTime";
    pub const BREAK_TIME: &str = "breakTime";
    pub const SESSIONS_TODAY: &str = "sessionsToday";
    pub const STREAK: &str = "streak";
    pub const LAST_SESSION_DATE: &str = "lastSessionDate";
}

/// Durable key-value mapping surviving process restarts.
pub trait StateStore: Send {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: StateStore + Sync> StateStore for std::sync::Arc<S> {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).kv_set(key, value)
    }
}

/// SQLite-backed store at `~/.config/focuspal/focuspal.db`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store, creating the file and schema if needed.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focuspal.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate().map_err(StoreError::from)?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let store = Self { conn };
        store.migrate().map_err(StoreError::from)?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and fakes.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self
            .map
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self
            .map
            .lock()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
