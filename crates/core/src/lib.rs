//! `hagakure-core`: domain foundation shared by the server and the client.
//!
//! Nothing in here knows about HTTP, storage or token formats.

pub mod email;
pub mod error;
pub mod id;

pub use email::Email;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
