//! `sessiongate-core` — shared foundation for the session layer.
//!
//! This crate contains the error taxonomy and strongly typed identifiers
//! (no I/O, no transport concerns).

pub mod error;
pub mod id;

pub use error::{AuthError, AuthResult};
pub use id::{PermissionId, RoleId, UserId};
