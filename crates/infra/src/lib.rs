//! Infrastructure layer: user storage adapters and fixture loading.

pub mod fixtures;
pub mod user_store;

pub use fixtures::{FixtureError, UserFixture, default_fixtures, load_fixture_file, seed};
pub use user_store::{InMemoryUserDirectory, UserStoreError};
