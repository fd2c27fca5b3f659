use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

/// Error body shared by every failure path: a machine-oriented key only.
pub fn json_error(status: StatusCode, key: &'static str) -> axum::response::Response {
    (status, axum::Json(json!({ "message": key }))).into_response()
}

pub fn unauthorized(key: &'static str) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, key)
}
