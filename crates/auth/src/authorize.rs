use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    Forbidden(String),
}

impl AuthzError {
    pub fn message_key(&self) -> &'static str {
        match self {
            AuthzError::Forbidden(_) => "auth.forbidden",
        }
    }
}

/// Server-side role check for an already authenticated principal.
///
/// This is the enforcement counterpart of the client's UI gate: the client
/// may hide buttons, but mutating routes still call this.
///
/// - No IO
/// - No panics
pub fn require_role(principal: &Principal, required: &Role) -> Result<(), AuthzError> {
    if principal.has_role(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
