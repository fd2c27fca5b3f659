//! Thin HTTP client over the hagakure API that keeps its [`Session`] in step
//! with login and logout.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::PermissionResolver;
use crate::session::{CachedUser, Session};
use crate::storage::{SessionStore, StorageError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success answer from the server, carrying its message key.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("no active session")]
    NotLoggedIn,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: CachedUser,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct ApiClient<S> {
    http: reqwest::Client,
    base_url: String,
    session: Session<S>,
}

impl<S> ApiClient<S>
where
    S: SessionStore,
{
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Session::new(store),
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn permissions(&self) -> PermissionResolver<'_, S> {
        PermissionResolver::new(&self.session)
    }

    /// POST /login. On success the token and user record are cached; on
    /// failure the previous session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<CachedUser, ClientError> {
        let res = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let body: LoginResponse = Self::read_json(res).await?;

        self.session.start(&body.token, &body.user)?;
        tracing::info!(email = ?body.user.email, "logged in");
        Ok(body.user)
    }

    /// Drop the local session. Tokens are not revocable server-side.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.end()?;
        Ok(())
    }

    /// GET /me with the cached bearer token.
    pub async fn me(&self) -> Result<CachedUser, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotLoggedIn)?;
        let res = self
            .http
            .get(self.url("/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(res).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json().await?);
        }

        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
        };
        tracing::debug!(%status, %message, "request rejected");
        Err(ClientError::Rejected { status, message })
    }
}
