use serde::{Deserialize, Serialize};

use sessiongate_core::PermissionId;

/// Operation half of a permission's `(resource, action)` key.
///
/// The four well-known actions are modeled explicitly; anything else the
/// server sends is kept verbatim in `Other` so that matching stays exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Read,
    Write,
    Delete,
    Execute,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
            Action::Execute => "execute",
            Action::Other(s) => s,
        }
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value {
            "read" => Action::Read,
            "write" => Action::Write,
            "delete" => Action::Delete,
            "execute" => Action::Execute,
            other => Action::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.as_str() {
            "read" | "write" | "delete" | "execute" => Action::from(value.as_str()),
            _ => Action::Other(value),
        }
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        match value {
            Action::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single grant, identified for authorization purposes by
/// `(resource, action)`. `name` is descriptive and never used for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub resource: String,
    pub action: Action,
}

impl Permission {
    pub fn new(
        name: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<Action>,
    ) -> Self {
        Self {
            id: PermissionId::new(),
            name: name.into(),
            description: String::new(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Exact match on both halves of the key.
    pub fn grants(&self, resource: &str, action: &Action) -> bool {
        self.resource == resource && &self.action == action
    }

    /// `resource.action`, the form used in logs and explanations.
    pub fn key(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}
