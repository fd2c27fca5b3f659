use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tokio::task::JoinError;

use hagakure_auth::{AuthFailure, Principal, SecretPolicy, TokenAuthenticator, UserDirectory};

use crate::app::errors;
use crate::context::PrincipalContext;

pub type Authenticator = TokenAuthenticator<Arc<dyn UserDirectory>>;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

/// Gate for protected routes: resolve the bearer token into a
/// [`PrincipalContext`] or answer 401 `{"message": "<key>"}`.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let outcome = match authenticate_request(&state.authenticator, req.headers()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "authentication task failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error");
        }
    };

    let authenticator = state.authenticator.as_ref();
    let principal = match outcome {
        Ok(principal) => principal,
        Err(failure) => {
            let body = authenticator.on_authentication_failure(&failure);
            return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        }
    };

    authenticator.on_authentication_success(&principal);
    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

/// One log line per request with method, path, status and latency.
pub async fn trace_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let res = next.run(req).await;
    tracing::info!(
        %method,
        %path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}

/// `Err` only when the blocking verification task itself failed.
async fn authenticate_request(
    authenticator: &Arc<Authenticator>,
    headers: &HeaderMap,
) -> Result<Result<Principal, AuthFailure>, JoinError> {
    let header = match bearer_header(authenticator, headers) {
        Ok(header) => header,
        Err(failure) => return Ok(Err(failure)),
    };

    if authenticator.secret_policy() != SecretPolicy::Verify {
        return Ok(authenticator.authenticate(Some(&header), Utc::now()));
    }

    // Verify hashes the secret with argon2 on every request; keep it off the
    // async workers.
    let authenticator = Arc::clone(authenticator);
    tokio::task::spawn_blocking(move || authenticator.authenticate(Some(&header), Utc::now())).await
}

fn bearer_header(authenticator: &Authenticator, headers: &HeaderMap) -> Result<String, AuthFailure> {
    let header = match headers.get(AUTHORIZATION) {
        None => None,
        // Opaque (non-visible-ASCII) header bytes can't hold a token.
        Some(value) => Some(value.to_str().map_err(|_| AuthFailure::InvalidToken)?),
    };

    match header {
        Some(value) if authenticator.supports(Some(value)) => Ok(value.to_string()),
        // Every route behind this middleware needs an identity.
        _ => Err(AuthFailure::MissingHeader),
    }
}
