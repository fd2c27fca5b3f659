//! User fixtures: a JSON list of `{email, password, roles}` hashed on load.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use hagakure_auth::{PasswordError, Role, UserRecord, hash_password};
use hagakure_core::{DomainError, Email};

use crate::{InMemoryUserDirectory, UserStoreError};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fixture: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("failed to store fixture: {0}")]
    Store(#[from] UserStoreError),
}

/// One fixture entry. The password is plain text; it is hashed by [`seed`].
#[derive(Debug, Clone, Deserialize)]
pub struct UserFixture {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Built-in accounts used when no fixture file is configured.
pub fn default_fixtures() -> Vec<UserFixture> {
    vec![
        UserFixture {
            email: "admin@hagakure.fr".to_string(),
            password: "admin123".to_string(),
            roles: vec![Role::ADMIN, Role::USER],
        },
        UserFixture {
            email: "user@hagakure.fr".to_string(),
            password: "user123".to_string(),
            roles: vec![Role::USER],
        },
    ]
}

pub fn load_fixture_file(path: impl AsRef<Path>) -> Result<Vec<UserFixture>, FixtureError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Hash and insert every fixture. Stops at the first invalid entry.
pub fn seed(directory: &InMemoryUserDirectory, fixtures: Vec<UserFixture>) -> Result<usize, FixtureError> {
    let mut seeded = 0;
    for fixture in fixtures {
        let email = Email::parse(fixture.email)?;
        let hash = hash_password(&fixture.password)?;
        directory.insert(UserRecord::new(email, hash, fixture.roles))?;
        seeded += 1;
    }
    tracing::info!(count = seeded, "seeded user fixtures");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use hagakure_auth::{UserDirectory, verify_password};

    use super::*;

    #[test]
    fn default_fixtures_include_the_admin_account() {
        let dir = InMemoryUserDirectory::new();
        assert_eq!(seed(&dir, default_fixtures()).unwrap(), 2);

        let admin = dir.find_by_identifier("admin@hagakure.fr").unwrap().unwrap();
        assert!(admin.roles.contains(&Role::ADMIN));
        assert!(verify_password("admin123", &admin.password_hash).unwrap());

        let user = dir.find_by_identifier("user@hagakure.fr").unwrap().unwrap();
        assert!(!user.roles.contains(&Role::ADMIN));
    }

    #[test]
    fn loads_fixture_file_with_optional_roles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"email":"musashi@hagakure.fr","password":"niten","roles":["ROLE_ADMIN"]}},
                {{"email":"kojiro@hagakure.fr","password":"tsubame"}}]"#
        )
        .unwrap();

        let fixtures = load_fixture_file(file.path()).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].roles, vec![Role::ADMIN]);
        assert!(fixtures[1].roles.is_empty());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_fixture_file("/nonexistent/users.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/users.json"));
    }

    #[test]
    fn invalid_email_stops_seeding() {
        let dir = InMemoryUserDirectory::new();
        let fixtures = vec![UserFixture {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
            roles: vec![],
        }];

        assert!(matches!(seed(&dir, fixtures), Err(FixtureError::Invalid(_))));
        assert_eq!(dir.find_by_identifier("not-an-email").unwrap(), None);
    }

    #[test]
    fn duplicate_fixture_is_a_store_error() {
        let dir = InMemoryUserDirectory::new();
        let mut fixtures = default_fixtures();
        fixtures.push(fixtures[1].clone());

        assert!(matches!(
            seed(&dir, fixtures),
            Err(FixtureError::Store(UserStoreError::Duplicate(_)))
        ));
    }
}
