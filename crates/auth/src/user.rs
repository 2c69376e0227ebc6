//! Server-issued user snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessiongate_core::UserId;

use crate::Role;
use crate::roles::null_as_empty;

/// Immutable snapshot of a user as last returned by the server.
///
/// A snapshot is never updated in place: anything that may change
/// authorization (role assignment, deactivation) is followed by a re-fetch.
/// `roles` may legitimately be empty, in which case the user holds no
/// permissions at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// `first last`, falling back to the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name.as_str())
    }
}
