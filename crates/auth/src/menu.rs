//! Navigation tree and feature flags as declared by the server.

use serde::{Deserialize, Serialize};

use crate::catalog::{MenuId, UnknownIdentifier};
use crate::roles::null_as_empty;

/// One entry in the navigation tree.
///
/// `accessible` is server-declared. The server normally returns only the
/// nodes the user may see, so an absent flag means "as returned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    pub path: String,
    #[serde(default)]
    pub permission: String,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<MenuNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<bool>,
}

impl MenuNode {
    pub fn is_accessible(&self) -> bool {
        self.accessible != Some(false)
    }

    /// Resolve the node against the closed menu catalog.
    pub fn menu_id(&self) -> Result<MenuId, UnknownIdentifier> {
        self.name.parse()
    }
}

/// Server-declared feature switches. Read-only to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub import: bool,
    #[serde(default)]
    pub backup: bool,
    #[serde(default)]
    pub maintenance: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Export,
    Import,
    Backup,
    Maintenance,
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Export => self.export,
            Feature::Import => self.import,
            Feature::Backup => self.backup,
            Feature::Maintenance => self.maintenance,
        }
    }
}

/// Response of `GET /api/v1/auth/menu-access`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAccess {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub menus: Vec<MenuNode>,
    #[serde(default)]
    pub features: FeatureFlags,
}

impl MenuAccess {
    /// The tree to render: nodes the server marked inaccessible are dropped
    /// together with their subtrees.
    pub fn visible_menus(&self) -> Vec<MenuNode> {
        prune(&self.menus)
    }

    /// Depth-first walk over visible nodes.
    pub fn flatten(&self) -> Vec<&MenuNode> {
        let mut out = Vec::new();
        walk(&self.menus, &mut out);
        out
    }

    /// First visible node whose path is exactly `path`.
    pub fn find(&self, path: &str) -> Option<&MenuNode> {
        self.flatten().into_iter().find(|n| n.path == path)
    }

    pub fn can_navigate(&self, path: &str) -> bool {
        self.find(path).is_some()
    }
}

fn prune(nodes: &[MenuNode]) -> Vec<MenuNode> {
    nodes
        .iter()
        .filter(|n| n.is_accessible())
        .map(|n| MenuNode {
            children: prune(&n.children),
            ..n.clone()
        })
        .collect()
}

fn walk<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuNode>) {
    for node in nodes.iter().filter(|n| n.is_accessible()) {
        out.push(node);
        walk(&node.children, out);
    }
}
