//! Explicit session context: the cached user record and bearer token.
//!
//! Written on login, cleared on logout, read on every permission check. The
//! cached roles are never re-validated against the server here, so they can
//! go stale until the next login.

use serde::{Deserialize, Serialize};

use crate::storage::{SessionStore, StorageError};

/// Storage key of the cached user record.
pub const USER_KEY: &str = "user";
/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// The user record as the API returns it and as [`Session::start`] caches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The only part of a cached record capability checks depend on. Every other
/// field is ignored whatever its shape; a record without `roles` has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CachedRoles {
    #[serde(default)]
    roles: Vec<String>,
}

impl CachedRoles {
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

pub struct Session<S> {
    store: S,
}

impl<S> Session<S>
where
    S: SessionStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a successful login. Either both entries are replaced or, on
    /// error, the previous session is restored.
    pub fn start(&self, token: &str, user: &CachedUser) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        let previous_token = self.store.get_item(TOKEN_KEY)?;

        self.store.set_item(TOKEN_KEY, token)?;
        if let Err(e) = self.store.set_item(USER_KEY, &json) {
            self.restore(TOKEN_KEY, previous_token.as_deref());
            return Err(e);
        }

        tracing::debug!(roles = ?user.roles, "session started");
        Ok(())
    }

    /// Forget everything; afterwards every capability check is fail-closed.
    pub fn end(&self) -> Result<(), StorageError> {
        self.store.remove_item(USER_KEY)?;
        self.store.remove_item(TOKEN_KEY)?;
        tracing::debug!("session ended");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached token");
                None
            }
        }
    }

    /// Roles of the cached record, or `None` when it is absent, unreadable,
    /// not a JSON object or has a non-array `roles`. Never errors.
    pub fn cached_roles(&self) -> Option<CachedRoles> {
        let raw = match self.store.get_item(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached user");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(roles) => Some(roles),
            Err(e) => {
                tracing::debug!(error = %e, "cached user is not a valid record");
                None
            }
        }
    }

    fn restore(&self, key: &str, previous: Option<&str>) {
        let restored = match previous {
            Some(value) => self.store.set_item(key, value),
            None => self.store.remove_item(key),
        };
        if let Err(e) = restored {
            tracing::warn!(key, error = %e, "failed to restore previous session entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStore;

    fn admin() -> CachedUser {
        CachedUser {
            id: None,
            email: Some("admin@hagakure.fr".to_string()),
            roles: vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()],
        }
    }

    /// Memory store whose writes to one key always fail.
    struct FailingWrites {
        inner: MemorySessionStore,
        key: &'static str,
    }

    impl SessionStore for FailingWrites {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::Poisoned);
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    fn previous_session(failing: &'static str) -> Session<FailingWrites> {
        let inner = MemorySessionStore::new();
        inner.set_item(TOKEN_KEY, "old-token").unwrap();
        inner.set_item(USER_KEY, r#"{"roles":["ROLE_USER"]}"#).unwrap();
        Session::new(FailingWrites { inner, key: failing })
    }

    #[test]
    fn start_then_end() {
        let session = Session::new(MemorySessionStore::new());
        session.start("dG9rZW4=", &admin()).unwrap();

        assert_eq!(session.token().as_deref(), Some("dG9rZW4="));
        assert!(session.cached_roles().unwrap().contains("ROLE_ADMIN"));

        session.end().unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(session.cached_roles(), None);
    }

    #[test]
    fn record_without_roles_has_none() {
        let session = Session::new(MemorySessionStore::new());
        session.store().set_item(USER_KEY, r#"{"email":"x@y"}"#).unwrap();

        assert_eq!(session.cached_roles(), Some(CachedRoles::default()));
    }

    #[test]
    fn other_fields_do_not_matter_whatever_their_shape() {
        let session = Session::new(MemorySessionStore::new());
        session
            .store()
            .set_item(USER_KEY, r#"{"id":1,"email":"admin@hagakure.fr","roles":["ROLE_ADMIN"]}"#)
            .unwrap();
        assert!(session.cached_roles().unwrap().contains("ROLE_ADMIN"));

        session
            .store()
            .set_item(USER_KEY, r#"{"id":{"n":1},"email":null,"active":true,"roles":["ROLE_USER"]}"#)
            .unwrap();
        assert!(session.cached_roles().unwrap().contains("ROLE_USER"));
    }

    #[test]
    fn malformed_record_reads_as_absent() {
        let session = Session::new(MemorySessionStore::new());
        session.store().set_item(USER_KEY, "{not json").unwrap();
        assert_eq!(session.cached_roles(), None);

        session.store().set_item(USER_KEY, r#"{"roles":"ROLE_ADMIN"}"#).unwrap();
        assert_eq!(session.cached_roles(), None);

        session.store().set_item(USER_KEY, r#"["ROLE_ADMIN"]"#).unwrap();
        assert_eq!(session.cached_roles(), None);
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let session = Session::new(MemorySessionStore::new());
        session.store().set_item(TOKEN_KEY, "").unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn failed_token_write_keeps_previous_session() {
        let session = previous_session(TOKEN_KEY);

        assert!(session.start("new-token", &admin()).is_err());
        assert_eq!(session.token().as_deref(), Some("old-token"));
        assert!(!session.cached_roles().unwrap().contains("ROLE_ADMIN"));
    }

    #[test]
    fn failed_user_write_restores_previous_token() {
        let session = previous_session(USER_KEY);

        assert!(session.start("new-token", &admin()).is_err());
        assert_eq!(session.token().as_deref(), Some("old-token"));
        assert!(!session.cached_roles().unwrap().contains("ROLE_ADMIN"));
    }

    #[test]
    fn failed_first_login_leaves_no_token_behind() {
        let session = Session::new(FailingWrites {
            inner: MemorySessionStore::new(),
            key: USER_KEY,
        });

        assert!(session.start("new-token", &admin()).is_err());
        assert_eq!(session.token(), None);
        assert_eq!(session.cached_roles(), None);
    }
}
