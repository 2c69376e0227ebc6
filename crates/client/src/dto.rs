//! Request/response bodies of the auth and admin endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sessiongate_auth::{Action, Credential, Permission, Role, User};
use sessiongate_core::{AuthError, AuthResult, PermissionId, RoleId};

use crate::TokenScheme;

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";
pub const ME_PATH: &str = "/api/v1/auth/me";
pub const MENU_ACCESS_PATH: &str = "/api/v1/auth/menu-access";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const LOGOUT_ALL_PATH: &str = "/api/v1/auth/logout-all";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const USERS_PATH: &str = "/api/v1/users";
pub const ROLES_PATH: &str = "/api/v1/roles";
pub const PERMISSIONS_PATH: &str = "/api/v1/permissions";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Profile submitted to `register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Registration {
    pub const MIN_PASSWORD_LEN: usize = 6;

    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Cheap local checks mirroring the server's binding rules, so obvious
    /// mistakes fail without a round-trip.
    pub fn validate(&self) -> AuthResult<()> {
        if self.username.trim().is_empty() {
            return Err(AuthError::validation("username is required"));
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AuthError::validation("email is not a valid address"));
        }
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err(AuthError::validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Login/register response. Accepts both the dual-token shape and the
/// single-token `{token, user}` variant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl AuthResponse {
    pub fn into_parts(self, scheme: TokenScheme) -> AuthResult<(Credential, User)> {
        let credential = credential_from(
            self.access_token,
            self.refresh_token,
            self.expires_at,
            scheme,
        )?;
        Ok((credential, self.user))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
}

pub(crate) fn credential_from(
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    scheme: TokenScheme,
) -> AuthResult<Credential> {
    if access_token.is_empty() {
        return Err(AuthError::decode("response carried an empty access token"));
    }

    let expires_at = expires_at.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    let credential = match scheme {
        TokenScheme::Dual => match refresh_token.filter(|t| !t.is_empty()) {
            Some(refresh) => Credential::new(access_token, refresh),
            None => return Err(AuthError::decode("response carried no refresh token")),
        },
        TokenScheme::Single => Credential::access_only(access_token),
    };
    Ok(credential.with_expiry(expires_at))
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleEnvelope {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RolesEnvelope {
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionEnvelope {
    pub permission: Permission,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsEnvelope {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// Filters for `GET /api/v1/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Partial update for `PUT /api/v1/users/:id`; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignRolesRequest {
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRole {
    pub name: String,
    pub description: String,
    pub permission_ids: Vec<PermissionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPermission {
    pub name: String,
    pub description: String,
    pub resource: String,
    pub action: Action,
}
