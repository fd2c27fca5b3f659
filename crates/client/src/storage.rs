//! Key/value storage backing a client session (the local-storage analogue).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open session database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("session database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create session directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String values under string keys. Synchronous by contract: reads happen
/// while rendering.
pub trait SessionStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// In-memory store for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|_| StorageError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| StorageError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

/// SQLite-backed store: one `session(key, value)` row per entry, surviving
/// process restarts.
pub struct SqliteSessionStore {
    db: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let db = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.display().to_string(),
            source,
        })?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS session (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        tracing::debug!(path = %path.display(), "session store opened");
        Ok(Self { db: Mutex::new(db) })
    }

    fn db(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.db.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl SessionStore for SqliteSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let db = self.db()?;
        let mut stmt = db.prepare_cached("SELECT value FROM session WHERE key = ?1")?;

        match stmt.query_row([key], |row| row.get(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db()?.execute(
            "INSERT INTO session (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.db()?.execute("DELETE FROM session WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get_item("user").unwrap(), None);

        store.set_item("user", "{}").unwrap();
        assert_eq!(store.get_item("user").unwrap().as_deref(), Some("{}"));

        store.remove_item("user").unwrap();
        assert_eq!(store.get_item("user").unwrap(), None);
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("session.db");

        SqliteSessionStore::open(&path)
            .unwrap()
            .set_item("user", r#"{"roles":[]}"#)
            .unwrap();

        let reopened = SqliteSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("user").unwrap().as_deref(), Some(r#"{"roles":[]}"#));

        reopened.remove_item("user").unwrap();
        reopened.remove_item("user").unwrap();
        assert_eq!(reopened.get_item("user").unwrap(), None);
    }

    #[test]
    fn sqlite_store_overwrites_and_keeps_keys_apart() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteSessionStore::open(tmp.path().join("session.db")).unwrap();

        store.set_item("token", "a").unwrap();
        store.set_item("token", "b").unwrap();
        store.set_item("../user", "c").unwrap();

        assert_eq!(store.get_item("token").unwrap().as_deref(), Some("b"));
        assert_eq!(store.get_item("../user").unwrap().as_deref(), Some("c"));
        assert_eq!(store.get_item("user").unwrap(), None);
    }

    #[test]
    fn unopenable_path_is_an_open_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        let err = SqliteSessionStore::open(tmp.path()).err().unwrap();
        assert!(matches!(err, StorageError::Open { .. } | StorageError::Sqlite(_)));
    }
}
