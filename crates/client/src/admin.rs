//! Administrative API: users, roles and permissions.
//!
//! Every call goes through the session's authenticated protocol; the server
//! enforces `users.*`, `roles.*` and `permissions.*` permissions and the
//! client surfaces whatever it refuses as `Forbidden`.

use std::collections::BTreeSet;
use std::sync::Arc;

use sessiongate_auth::{Permission, Role, User};
use sessiongate_core::{AuthResult, PermissionId, RoleId, UserId};

use crate::dto::{
    self, AssignRolesRequest, NewPermission, NewRole, PermissionEnvelope, PermissionsEnvelope,
    RoleEnvelope, RolesEnvelope, UserEnvelope, UserPage, UserQuery, UserUpdate,
};
use crate::session::SessionManager;
use crate::transport::ApiRequest;

/// A set of checked entities, keyed by identity rather than list position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T: Ord + Copy> {
    ids: BTreeSet<T>,
}

pub type RoleSelection = Selection<RoleId>;
pub type PermissionSelection = Selection<PermissionId>;

impl<T: Ord + Copy> Default for Selection<T> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Copy> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one entry; returns whether it is now selected.
    pub fn toggle(&mut self, id: T) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn set(&mut self, id: T, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn contains(&self, id: T) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<T> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<T: Ord + Copy> FromIterator<T> for Selection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl RoleSelection {
    /// Pre-checked with the roles the user currently holds.
    pub fn from_user(user: &User) -> Self {
        user.roles.iter().map(|r| r.id).collect()
    }
}

impl PermissionSelection {
    pub fn from_role(role: &Role) -> Self {
        role.permissions.iter().map(|p| p.id).collect()
    }
}

impl NewRole {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: &PermissionSelection,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permission_ids: permissions.ids(),
        }
    }
}

pub struct AdminClient {
    session: Arc<SessionManager>,
}

impl AdminClient {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    pub async fn list_users(&self, query: &UserQuery) -> AuthResult<UserPage> {
        let mut request = ApiRequest::get(dto::USERS_PATH);
        if let Some(page) = query.page {
            request = request.query("page", page);
        }
        if let Some(limit) = query.limit {
            request = request.query("limit", limit);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.query("search", search.trim());
        }
        if let Some(active) = query.active {
            request = request.query("active", active);
        }
        self.session.request_json(request).await
    }

    pub async fn get_user(&self, id: UserId) -> AuthResult<User> {
        let envelope: UserEnvelope = self
            .session
            .request_json(ApiRequest::get(user_path(id)))
            .await?;
        Ok(envelope.user)
    }

    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> AuthResult<User> {
        let request = ApiRequest::put(user_path(id)).json(update)?;
        let envelope: UserEnvelope = self.session.request_json(request).await?;
        tracing::info!(user_id = %id, "user updated");
        Ok(envelope.user)
    }

    pub async fn set_user_active(&self, id: UserId, active: bool) -> AuthResult<User> {
        let update = UserUpdate {
            is_active: Some(active),
            ..Default::default()
        };
        self.update_user(id, &update).await
    }

    /// Replace the user's roles with exactly `roles`.
    pub async fn assign_roles(&self, id: UserId, roles: &RoleSelection) -> AuthResult<User> {
        let body = AssignRolesRequest {
            role_ids: roles.ids(),
        };
        let request = ApiRequest::post(format!("{}/roles", user_path(id))).json(&body)?;
        let envelope: UserEnvelope = self.session.request_json(request).await?;
        tracing::info!(user_id = %id, roles = roles.len(), "roles assigned");
        Ok(envelope.user)
    }

    pub async fn list_roles(&self) -> AuthResult<Vec<Role>> {
        let envelope: RolesEnvelope = self
            .session
            .request_json(ApiRequest::get(dto::ROLES_PATH))
            .await?;
        Ok(envelope.roles)
    }

    pub async fn create_role(&self, role: &NewRole) -> AuthResult<Role> {
        let request = ApiRequest::post(dto::ROLES_PATH).json(role)?;
        let envelope: RoleEnvelope = self.session.request_json(request).await?;
        tracing::info!(role = %envelope.role.name, "role created");
        Ok(envelope.role)
    }

    pub async fn delete_role(&self, id: RoleId) -> AuthResult<()> {
        let request = ApiRequest::delete(format!("{}/{id}", dto::ROLES_PATH));
        let _: serde_json::Value = self.session.request_json(request).await?;
        tracing::info!(role_id = %id, "role deleted");
        Ok(())
    }

    pub async fn list_permissions(&self) -> AuthResult<Vec<Permission>> {
        let envelope: PermissionsEnvelope = self
            .session
            .request_json(ApiRequest::get(dto::PERMISSIONS_PATH))
            .await?;
        Ok(envelope.permissions)
    }

    pub async fn create_permission(&self, permission: &NewPermission) -> AuthResult<Permission> {
        let request = ApiRequest::post(dto::PERMISSIONS_PATH).json(permission)?;
        let envelope: PermissionEnvelope = self.session.request_json(request).await?;
        tracing::info!(permission = %envelope.permission.name, "permission created");
        Ok(envelope.permission)
    }
}

fn user_path(id: UserId) -> String {
    format!("{}/{id}", dto::USERS_PATH)
}
