use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use hagakure_auth::{DirectoryError, UserDirectory, UserRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("email already registered: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Unavailable(#[from] DirectoryError),
}

fn poisoned() -> DirectoryError {
    DirectoryError::Unavailable("user store lock poisoned".to_string())
}

/// In-memory user store for tests/dev, keyed by exact e-mail.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. E-mails are unique.
    pub fn insert(&self, user: UserRecord) -> Result<(), UserStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let key = user.email.as_str().to_string();
        if map.contains_key(&key) {
            return Err(UserStoreError::Duplicate(key));
        }
        map.insert(key, user);
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(identifier).cloned())
    }
}
