//! Menu and feature resolution.
//!
//! The server decides what a user may navigate to. This module fetches that
//! decision and renders it; the role/menu catalog is only used to report
//! drift between what the server served and what the catalog documents.

use std::collections::BTreeSet;
use std::sync::Arc;

use sessiongate_auth::{FeatureFlags, KnownRole, MenuAccess, MenuId, MenuNode, User};
use sessiongate_core::AuthResult;

use crate::dto;
use crate::session::SessionManager;
use crate::transport::ApiRequest;

pub struct MenuResolver {
    session: Arc<SessionManager>,
}

impl MenuResolver {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// `GET /api/v1/auth/menu-access` through the authenticated protocol.
    pub async fn menu_access(&self) -> AuthResult<MenuAccess> {
        let access: MenuAccess = self
            .session
            .request_json(ApiRequest::get(dto::MENU_ACCESS_PATH))
            .await?;
        tracing::debug!(menus = access.menus.len(), "menu access resolved");
        Ok(access)
    }

    pub async fn visible_menus(&self) -> AuthResult<Vec<MenuNode>> {
        Ok(self.menu_access().await?.visible_menus())
    }

    pub async fn features(&self) -> AuthResult<FeatureFlags> {
        Ok(self.menu_access().await?.features)
    }
}

/// Differences between a served menu tree and the catalog's expectations
/// for the user's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDrift {
    /// Served menus no known role of this user is documented to see.
    pub unexpected: Vec<MenuId>,
    /// Documented menus the server did not serve.
    pub missing: Vec<MenuId>,
    /// Served menu names absent from the catalog altogether.
    pub unknown_menus: Vec<String>,
    /// Role names absent from the catalog; their expectations are unknown.
    pub unknown_roles: Vec<String>,
}

impl CatalogDrift {
    pub fn is_empty(&self) -> bool {
        self.unexpected.is_empty()
            && self.missing.is_empty()
            && self.unknown_menus.is_empty()
            && self.unknown_roles.is_empty()
    }
}

/// Compare what the server served against [`KnownRole::expected_menus`].
///
/// Informational only. The result never changes what is rendered.
pub fn catalog_drift(access: &MenuAccess, user: &User) -> CatalogDrift {
    let mut drift = CatalogDrift::default();

    let mut expected = BTreeSet::new();
    for name in user.role_names() {
        match name.parse::<KnownRole>() {
            Ok(role) => expected.extend(role.expected_menus().iter().copied()),
            Err(_) => drift.unknown_roles.push(name.to_string()),
        }
    }

    let mut served = BTreeSet::new();
    for node in access.flatten() {
        match node.menu_id() {
            Ok(id) => {
                served.insert(id);
            }
            Err(_) => drift.unknown_menus.push(node.name.clone()),
        }
    }

    drift.unexpected = served.difference(&expected).copied().collect();
    drift.missing = expected.difference(&served).copied().collect();

    if !drift.is_empty() {
        tracing::debug!(username = %user.username, ?drift, "served menus differ from catalog");
    }
    drift
}
