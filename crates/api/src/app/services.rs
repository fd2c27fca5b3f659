use std::sync::Arc;

use thiserror::Error;

use hagakure_auth::{TokenAuthenticator, UserDirectory};
use hagakure_infra::{FixtureError, InMemoryUserDirectory, default_fixtures, load_fixture_file, seed};

use crate::config::ApiConfig;
use crate::middleware::Authenticator;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load user fixtures: {0}")]
    Fixtures(#[from] FixtureError),
}

/// Shared, read-only services handed to handlers via `Extension`.
pub struct AppServices {
    pub authenticator: Arc<Authenticator>,
}

impl AppServices {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        &**self.authenticator.directory()
    }

    pub fn token_scheme(&self) -> &'static str {
        self.authenticator.codec().scheme()
    }
}

/// Seed the in-memory directory and build the authenticator from config.
pub fn build_state(config: &ApiConfig) -> Result<Arc<AppServices>, StartupError> {
    let directory = InMemoryUserDirectory::new();
    let fixtures = match &config.fixtures {
        Some(path) => load_fixture_file(path)?,
        None => default_fixtures(),
    };
    seed(&directory, fixtures)?;

    let directory: Arc<dyn UserDirectory> = Arc::new(directory);
    let authenticator =
        TokenAuthenticator::new(config.codec(), directory).with_secret_policy(config.secret_policy);

    tracing::info!(
        token_scheme = authenticator.codec().scheme(),
        secret_policy = ?authenticator.secret_policy(),
        "authenticator ready"
    );

    Ok(Arc::new(AppServices::new(authenticator)))
}
