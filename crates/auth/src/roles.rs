use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role label attached to a user record (e.g. `ROLE_ADMIN`).
///
/// Labels are opaque strings compared exactly; there is no hierarchy
/// between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("ROLE_ADMIN"));
    pub const USER: Role = Role(Cow::Borrowed("ROLE_USER"));

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
