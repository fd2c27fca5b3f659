//! Token codecs: the paired issue/decode contract for bearer tokens.
//!
//! Two schemes exist:
//! - [`Base64Codec`]: `base64(identity ":" secret)`, no signature, no expiry.
//!   This is the wire format existing clients send.
//! - [`Hs256Codec`]: an HS256 JWT whose `sub` is the identity, with `iat`/`exp`.

use base64::{
    Engine as _,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};

/// Standard alphabet; padding optional on decode, always written on encode.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The payload could not be decoded at all (bad base64, not UTF-8,
    /// malformed JWT).
    #[error("token payload could not be decoded")]
    Decode,

    /// Decoded, but fewer than two `:`-separated segments.
    #[error("token has fewer than two segments")]
    Format,

    #[error("token signature mismatch")]
    Signature,

    #[error("token time window rejected: {0}")]
    Window(#[from] TokenValidationError),

    #[error("cannot issue token: {0}")]
    Issue(String),
}

/// What a decoded token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Identity claim (first segment / `sub`). Not format-checked.
    pub claim: String,

    /// Everything after the first `:` for the base64 scheme; `None` for
    /// signed tokens, whose signature stands in for the secret.
    pub secret: Option<String>,
}

/// Paired encode/decode contract.
pub trait TokenCodec: Send + Sync {
    /// Short scheme name used in logs and configuration.
    fn scheme(&self) -> &'static str;

    fn issue(&self, identity: &str, secret: &str, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<DecodedToken, TokenError>;
}

/// Unsigned `base64(identity:secret)` tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Base64Codec {
    pub fn new() -> Self {
        Self
    }
}

impl TokenCodec for Base64Codec {
    fn scheme(&self) -> &'static str {
        "legacy"
    }

    fn issue(&self, identity: &str, secret: &str, _now: DateTime<Utc>) -> Result<String, TokenError> {
        if identity.contains(':') {
            return Err(TokenError::Issue("identity must not contain ':'".to_string()));
        }
        Ok(LENIENT_STANDARD.encode(format!("{identity}:{secret}")))
    }

    fn decode(&self, token: &str, _now: DateTime<Utc>) -> Result<DecodedToken, TokenError> {
        let bytes = LENIENT_STANDARD.decode(token).map_err(|_| TokenError::Decode)?;
        let text = String::from_utf8(bytes).map_err(|_| TokenError::Decode)?;

        // At least two segments: identity before the first ':' and the rest.
        let (claim, secret) = text.split_once(':').ok_or(TokenError::Format)?;

        Ok(DecodedToken {
            claim: claim.to_string(),
            secret: Some(secret.to_string()),
        })
    }
}

/// HS256-signed, expiring tokens.
#[derive(Clone)]
pub struct Hs256Codec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256Codec {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn validation() -> Validation {
        // Time checks go through `validate_claims` with the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl core::fmt::Debug for Hs256Codec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Codec").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256Codec {
    fn scheme(&self) -> &'static str {
        "signed"
    }

    fn issue(&self, identity: &str, _secret: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims::new(identity, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<DecodedToken, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::Signature,
                _ => TokenError::Decode,
            })?;

        validate_claims(&data.claims, now)?;

        Ok(DecodedToken {
            claim: data.claims.sub,
            secret: None,
        })
    }
}
