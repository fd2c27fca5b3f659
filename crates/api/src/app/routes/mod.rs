use axum::{Router, routing::get};

pub mod admin;
pub mod login;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .nest("/admin", admin::router())
}
