use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::app::dto::SessionUser;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /me - the identity the bearer token resolved to.
pub async fn me(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(SessionUser::from(principal.principal()))
}
