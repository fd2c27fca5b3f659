//! Environment-driven configuration for the API process.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use hagakure_auth::{Base64Codec, Hs256Codec, SecretPolicy, TokenCodec};

const DEV_TOKEN_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Which token format the server issues and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenScheme {
    /// `base64(email:secret)`, unsigned.
    #[default]
    Legacy,
    /// HS256 JWT with expiry.
    Signed,
}

impl TokenScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScheme::Legacy => "legacy",
            TokenScheme::Signed => "signed",
        }
    }
}

impl FromStr for TokenScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "signed" => Ok(Self::Signed),
            other => Err(format!("unknown token scheme '{other}' (expected legacy|signed)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `HAGAKURE_BIND`
    pub bind: String,
    /// `HAGAKURE_TOKEN_SCHEME`
    pub token_scheme: TokenScheme,
    /// `HAGAKURE_TOKEN_SECRET` (signing key for the signed scheme)
    pub token_secret: String,
    /// `HAGAKURE_TOKEN_TTL_SECS`
    pub token_ttl: Duration,
    /// `HAGAKURE_SECRET_POLICY`
    pub secret_policy: SecretPolicy,
    /// `HAGAKURE_FIXTURES`; built-in accounts when unset.
    pub fixtures: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            token_scheme: TokenScheme::default(),
            token_secret: DEV_TOKEN_SECRET.to_string(),
            token_ttl: Duration::hours(1),
            secret_policy: SecretPolicy::default(),
            fixtures: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in
    /// production, a map in tests). Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup("HAGAKURE_BIND") {
            config.bind = bind;
        }

        if let Some(scheme) = lookup("HAGAKURE_TOKEN_SCHEME") {
            config.token_scheme = scheme
                .parse()
                .map_err(|e: String| ConfigError::invalid("HAGAKURE_TOKEN_SCHEME", e))?;
        }

        match lookup("HAGAKURE_TOKEN_SECRET") {
            Some(secret) if !secret.is_empty() => config.token_secret = secret,
            Some(_) => return Err(ConfigError::invalid("HAGAKURE_TOKEN_SECRET", "must not be empty")),
            None if config.token_scheme == TokenScheme::Signed => {
                tracing::warn!("HAGAKURE_TOKEN_SECRET not set; using insecure dev default");
            }
            None => {}
        }

        if let Some(ttl) = lookup("HAGAKURE_TOKEN_TTL_SECS") {
            let secs: i64 = ttl
                .parse()
                .map_err(|_| ConfigError::invalid("HAGAKURE_TOKEN_TTL_SECS", "not an integer"))?;
            if secs <= 0 {
                return Err(ConfigError::invalid("HAGAKURE_TOKEN_TTL_SECS", "must be positive"));
            }
            config.token_ttl = Duration::seconds(secs);
        }

        if let Some(policy) = lookup("HAGAKURE_SECRET_POLICY") {
            config.secret_policy = policy
                .parse()
                .map_err(|e: String| ConfigError::invalid("HAGAKURE_SECRET_POLICY", e))?;
        }

        config.fixtures = lookup("HAGAKURE_FIXTURES").map(PathBuf::from);

        Ok(config)
    }

    pub fn codec(&self) -> Arc<dyn TokenCodec> {
        match self.token_scheme {
            TokenScheme::Legacy => Arc::new(Base64Codec::new()),
            TokenScheme::Signed => Arc::new(Hs256Codec::new(&self.token_secret, self.token_ttl)),
        }
    }
}
