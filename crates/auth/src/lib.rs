//! `sessiongate-auth` — client-side authorization model (pure, no I/O).
//!
//! Holds the server's user/role/permission snapshot types and the evaluator
//! that answers role and permission questions about them. This is a UI gate;
//! the server remains the enforcement point.

pub mod authorize;
pub mod catalog;
pub mod credential;
pub mod menu;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{
    AuthorizationExplanation, effective_permissions, explain_permission, has_permission,
    has_role, require_permission, require_role,
};
pub use catalog::{KnownRole, MenuId, RoleColor, UnknownIdentifier, role_color};
pub use credential::Credential;
pub use menu::{Feature, FeatureFlags, MenuAccess, MenuNode};
pub use permissions::{Action, Permission};
pub use roles::Role;
pub use user::User;
