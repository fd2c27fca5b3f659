//! Administrative endpoints. Every handler checks `ROLE_ADMIN` server-side.

use axum::{
    Extension, Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use hagakure_auth::Role;

use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/ping", get(ping))
}

/// GET /admin/ping - 200 for administrators, 403 otherwise.
pub async fn ping(Extension(principal): Extension<PrincipalContext>) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, &Role::ADMIN) {
        return resp;
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "email": principal.email().as_str(),
        })),
    )
        .into_response()
}
