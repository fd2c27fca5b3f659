//! Token issuance: exchange e-mail + password for a bearer token.

use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use hagakure_auth::{Principal, UserRecord, verify_password};

use crate::app::dto::{LoginRequest, LoginResponse, SessionUser};
use crate::app::errors;
use crate::app::services::AppServices;

const LOGIN_REJECTED: &str = "auth.login.rejected";

/// POST /login
///
/// Unknown e-mail, wrong password and unreadable stored hash all produce the
/// same 401 body.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    let user = match services.directory().find_by_identifier(&body.email) {
        Ok(Some(user)) => user,
        Ok(None) => return errors::unauthorized(LOGIN_REJECTED),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during login");
            return errors::unauthorized(LOGIN_REJECTED);
        }
    };

    // argon2 is CPU-bound; keep it off the async workers.
    let password = body.password;
    let verified = tokio::task::spawn_blocking(move || check_password(user, password)).await;

    let (user, password) = match verified {
        Ok(Some(pair)) => pair,
        Ok(None) => return errors::unauthorized(LOGIN_REJECTED),
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error");
        }
    };

    let token = match services.authenticator.issue(&user, &password, Utc::now()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "token issuance failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error");
        }
    };

    tracing::info!(user_id = %user.id, "login succeeded");

    let principal = Principal::from(&user);
    (
        StatusCode::OK,
        Json(LoginResponse {
            token,
            token_scheme: services.token_scheme(),
            user: SessionUser::from(&principal),
        }),
    )
        .into_response()
}

fn check_password(user: UserRecord, password: String) -> Option<(UserRecord, String)> {
    match verify_password(&password, &user.password_hash) {
        Ok(true) => Some((user, password)),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "stored password hash unreadable");
            None
        }
    }
}
