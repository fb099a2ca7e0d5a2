//! SQLite-backed local preferences.
//!
//! Used wherever the device has no native secure preferences store. Holds a
//! single `kv` table; each write is one `INSERT OR REPLACE`, so a value is
//! either the previous record or the new one, never a mix.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::config::StorageBackend;
use super::preferences::PreferencesStore;
use crate::error::PreferencesError;

/// Local store at `<data_dir>/touchgrass.db`.
pub struct LocalPreferences {
    conn: Mutex<Connection>,
}

impl LocalPreferences {
    pub const FILE_NAME: &'static str = "touchgrass.db";

    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, PreferencesError> {
        let conn = Connection::open(path).map_err(|source| PreferencesError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        tracing::debug!(path = %path.display(), "opened local preferences");
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, PreferencesError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PreferencesError> {
        self.conn.lock().map_err(|_| PreferencesError::Locked)
    }

    fn migrate(&self) -> Result<(), PreferencesError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl PreferencesStore for LocalPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
