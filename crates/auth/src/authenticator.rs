//! Bearer-token authenticator.
//!
//! Transport-agnostic: the caller passes the raw `Authorization` header value
//! (if any). Every failure is a tagged [`AuthFailure`] internally and a
//! uniform 401 `{"message": "<key>"}` externally.

use std::{str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
    DirectoryError, Principal, TokenCodec, TokenError, UserDirectory, UserRecord,
    claims::TokenValidationError, password::verify_password,
};

/// Literal prefix stripped from the header value. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// What to do with the secret segment of a decoded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretPolicy {
    /// The secret is carried but never checked; possession of a token for a
    /// known identity is enough.
    #[default]
    Ignore,
    /// The secret must verify against the user's password hash. Signed
    /// tokens carry no secret and are accepted on their signature.
    Verify,
}

impl FromStr for SecretPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "verify" => Ok(Self::Verify),
            other => Err(format!("unknown secret policy '{other}' (expected ignore|verify)")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No `Authorization` header on a route that requires one.
    #[error("authorization header missing")]
    MissingHeader,

    /// Header present but its value is empty.
    #[error("authorization header empty")]
    MissingToken,

    /// Nothing usable after the prefix, or a token rejected for a reason we
    /// don't distinguish further (bad signature, unreadable header).
    #[error("invalid token")]
    InvalidToken,

    /// Decoded, but fewer than two `:`-separated segments.
    #[error("token format invalid")]
    InvalidTokenFormat,

    #[error("token could not be decoded")]
    DecodeFailure,

    #[error("no user matches the identity claim")]
    UserNotFound,

    #[error("token secret does not match")]
    SecretMismatch,

    #[error("token expired")]
    Expired,

    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl AuthFailure {
    /// Short, client-facing key. Several variants share a key so that a
    /// corrupt token can't be told apart from a structurally wrong one.
    pub fn message_key(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader | AuthFailure::MissingToken => "auth.token.missing",
            AuthFailure::InvalidToken | AuthFailure::DecodeFailure => "auth.token.invalid",
            AuthFailure::InvalidTokenFormat => "auth.token.format",
            AuthFailure::UserNotFound
            | AuthFailure::SecretMismatch
            | AuthFailure::Expired
            | AuthFailure::DirectoryUnavailable(_) => "auth.token.rejected",
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Decode => AuthFailure::DecodeFailure,
            TokenError::Format => AuthFailure::InvalidTokenFormat,
            TokenError::Window(TokenValidationError::Expired) => AuthFailure::Expired,
            TokenError::Signature | TokenError::Window(_) | TokenError::Issue(_) => {
                AuthFailure::InvalidToken
            }
        }
    }
}

impl From<DirectoryError> for AuthFailure {
    fn from(value: DirectoryError) -> Self {
        AuthFailure::DirectoryUnavailable(value.to_string())
    }
}

/// Body of the 401 produced for any authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureResponse {
    pub message: &'static str,
}

impl FailureResponse {
    pub const STATUS: u16 = 401;
}

pub struct TokenAuthenticator<D> {
    codec: Arc<dyn TokenCodec>,
    directory: D,
    secret_policy: SecretPolicy,
}

impl<D> TokenAuthenticator<D>
where
    D: UserDirectory,
{
    pub fn new(codec: Arc<dyn TokenCodec>, directory: D) -> Self {
        Self {
            codec,
            directory,
            secret_policy: SecretPolicy::default(),
        }
    }

    pub fn with_secret_policy(mut self, policy: SecretPolicy) -> Self {
        self.secret_policy = policy;
        self
    }

    pub fn secret_policy(&self) -> SecretPolicy {
        self.secret_policy
    }

    pub fn codec(&self) -> &dyn TokenCodec {
        self.codec.as_ref()
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Only requests carrying an `Authorization` header are handled here;
    /// everything else falls through to anonymous handling.
    pub fn supports(&self, authorization: Option<&str>) -> bool {
        authorization.is_some()
    }

    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthFailure> {
        let header = authorization.ok_or(AuthFailure::MissingHeader)?;
        if header.is_empty() {
            return Err(AuthFailure::MissingToken);
        }

        let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header);
        if token.is_empty() {
            return Err(AuthFailure::InvalidToken);
        }

        // Format is checked here, before the directory is ever consulted.
        let decoded = self.codec.decode(token, now)?;

        let user = self
            .directory
            .find_by_identifier(&decoded.claim)
            .inspect_err(|e| tracing::error!(error = %e, "user lookup failed during authentication"))?
            .ok_or(AuthFailure::UserNotFound)?;

        if self.secret_policy == SecretPolicy::Verify
            && let Some(secret) = decoded.secret.as_deref()
        {
            self.verify_secret(&user, secret)?;
        }

        Ok(Principal::from(user))
    }

    /// Map any failure to the uniform 401 body. Never includes the token or
    /// the decoded claim.
    pub fn on_authentication_failure(&self, failure: &AuthFailure) -> FailureResponse {
        match failure {
            AuthFailure::DirectoryUnavailable(_) => {
                tracing::warn!(reason = %failure, "authentication rejected")
            }
            _ => tracing::debug!(reason = ?failure, "authentication rejected"),
        }
        FailureResponse {
            message: failure.message_key(),
        }
    }

    /// Nothing to do: the request continues to its handler.
    pub fn on_authentication_success(&self, _principal: &Principal) {}

    /// Issue a token for `user` with the configured scheme.
    pub fn issue(&self, user: &UserRecord, secret: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.codec.issue(user.email.as_str(), secret, now)
    }

    fn verify_secret(&self, user: &UserRecord, secret: &str) -> Result<(), AuthFailure> {
        match verify_password(secret, &user.password_hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthFailure::SecretMismatch),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "stored password hash unreadable");
                Err(AuthFailure::SecretMismatch)
            }
        }
    }
}
