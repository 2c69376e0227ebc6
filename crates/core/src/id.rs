//! Strongly-typed identifiers for server-owned entities.
//!
//! The server assigns every id; the client only parses, compares and echoes
//! them back (role assignment, admin edits). Distinct types keep a role id
//! from being sent where a permission id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

macro_rules! server_id {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Fresh time-ordered id, for fixtures and locally built values.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = AuthError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s.trim()).map(Self).map_err(|e| {
                    AuthError::validation(format!("invalid {}: {e}", stringify!($t)))
                })
            }
        }
    };
}

server_id!(
    /// A user account.
    UserId
);
server_id!(
    /// A role (named bundle of permissions).
    RoleId
);
server_id!(PermissionId);
