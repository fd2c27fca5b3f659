//! API-side role guard.
//!
//! Mutating and administrative routes call this before doing any work; the
//! client-side permission check is only a UI hint.

use axum::http::StatusCode;

use hagakure_auth::{Role, require_role};

use crate::app::errors;
use crate::context::PrincipalContext;

/// `Err` carries the ready-made 403 response.
pub fn require(principal: &PrincipalContext, role: &Role) -> Result<(), axum::response::Response> {
    require_role(principal.principal(), role).map_err(|e| {
        tracing::debug!(user_id = %principal.user_id(), error = %e, "authorization denied");
        errors::json_error(StatusCode::FORBIDDEN, e.message_key())
    })
}
