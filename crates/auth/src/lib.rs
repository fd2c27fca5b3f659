//! `hagakure-auth`: bearer-token authentication boundary.
//!
//! No HTTP or storage types appear here: callers hand
//! in the raw `Authorization` header value and a [`UserDirectory`], and get
//! back either a [`Principal`] or a tagged [`AuthFailure`].

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod directory;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authenticator::{AuthFailure, FailureResponse, SecretPolicy, TokenAuthenticator};
pub use authorize::{AuthzError, require_role};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use directory::{DirectoryError, UserDirectory};
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use token::{Base64Codec, DecodedToken, Hs256Codec, TokenCodec, TokenError};
pub use user::{Principal, UserRecord};
