//! `hagakure-client`: client-side session handling and UI permission checks.
//!
//! The permission answers here are hints for rendering (show or hide the
//! edit button). The server re-checks every mutating call.

pub mod api;
pub mod permissions;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ClientError};
pub use permissions::PermissionResolver;
pub use session::{CachedRoles, CachedUser, Session};
pub use storage::{MemorySessionStore, SessionStore, SqliteSessionStore, StorageError};
