//! E-mail address value object.

use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult};

/// A user's login identifier.
///
/// Stored exactly as given: lookups compare the raw string, so
/// `Admin@hagakure.fr` and `admin@hagakure.fr` are different identities.
/// [`Email::parse`] only rejects values that could never be an address
/// (empty, no `@`, or containing `:` which would break the token format).
///
/// Deserialization goes through the same check, so a stored record can't
/// smuggle in an address `parse` would refuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::validation("email must not be empty"));
        }
        if !raw.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        if raw.contains(':') {
            return Err(DomainError::validation("email must not contain ':'"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
