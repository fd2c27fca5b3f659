use std::sync::Arc;

use thiserror::Error;

use crate::UserRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup of user records by login identifier.
///
/// Matching is exact: no trimming, no case folding.
pub trait UserDirectory: Send + Sync {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, DirectoryError>;
}

impl<D> UserDirectory for Arc<D>
where
    D: UserDirectory + ?Sized,
{
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, DirectoryError> {
        (**self).find_by_identifier(identifier)
    }
}
