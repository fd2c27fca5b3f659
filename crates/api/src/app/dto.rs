use serde::{Deserialize, Serialize};

use hagakure_auth::Principal;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// The record a client caches under its `user` storage key.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&Principal> for SessionUser {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.user_id.to_string(),
            email: principal.email.to_string(),
            roles: principal.roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_scheme: &'static str,
    pub user: SessionUser,
}
