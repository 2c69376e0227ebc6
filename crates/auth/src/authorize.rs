//! Authorization evaluation over a user snapshot.
//!
//! These functions are the single source of truth for role and permission
//! checks on the client. They are a UI gate only; the server enforces.
//!
//! - No IO
//! - No panics
//! - Exact, case-sensitive matching (no wildcards, no hierarchy)

use std::collections::BTreeSet;

use serde::Serialize;

use sessiongate_core::{AuthError, AuthResult, UserId};

use crate::{Action, User};

/// True iff some role held by `user` is named exactly `name`.
pub fn has_role(name: &str, user: Option<&User>) -> bool {
    user.is_some_and(|u| u.roles.iter().any(|r| r.name == name))
}

/// True iff some role held by `user` carries a permission with exactly this
/// `(resource, action)` key.
///
/// O(roles × permissions); both are expected to be small.
pub fn has_permission(resource: &str, action: &Action, user: Option<&User>) -> bool {
    user.is_some_and(|u| {
        u.roles
            .iter()
            .flat_map(|r| r.permissions.iter())
            .any(|p| p.grants(resource, action))
    })
}

/// Result-returning form of [`has_role`] for call sites that propagate.
pub fn require_role(name: &str, user: Option<&User>) -> AuthResult<()> {
    let Some(user) = user else {
        return Err(AuthError::Unauthenticated);
    };
    if has_role(name, Some(user)) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!("missing role '{name}'")))
    }
}

/// Result-returning form of [`has_permission`].
pub fn require_permission(resource: &str, action: &Action, user: Option<&User>) -> AuthResult<()> {
    let Some(user) = user else {
        return Err(AuthError::Unauthenticated);
    };
    if has_permission(resource, action, Some(user)) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!("missing permission '{resource}.{action}'")))
    }
}

/// Union of every `(resource, action)` key granted through the user's roles.
pub fn effective_permissions(user: &User) -> BTreeSet<(String, Action)> {
    user.roles
        .iter()
        .flat_map(|r| r.permissions.iter())
        .map(|p| (p.resource.clone(), p.action.clone()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a permission decision, for debugging screens and
/// "why can't I see this?" support requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    /// `resource.action` that was checked.
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub user_id: Option<UserId>,
    pub roles: Vec<String>,
    /// Sorted `resource.action` keys.
    pub effective_permissions: Vec<String>,
    /// Roles that carry the required key (empty when denied).
    pub granting_roles: Vec<String>,
}

/// Explain why `has_permission(resource, action, user)` returns what it does.
pub fn explain_permission(
    resource: &str,
    action: &Action,
    user: Option<&User>,
) -> AuthorizationExplanation {
    let required_permission = format!("{resource}.{action}");

    let Some(user) = user else {
        return AuthorizationExplanation {
            required_permission,
            granted: false,
            reason: "No user is signed in".to_string(),
            user_id: None,
            roles: Vec::new(),
            effective_permissions: Vec::new(),
            granting_roles: Vec::new(),
        };
    };

    let effective: Vec<String> = effective_permissions(user)
        .into_iter()
        .map(|(res, act)| format!("{res}.{act}"))
        .collect();

    let granting_roles: Vec<String> = user
        .roles
        .iter()
        .filter(|r| r.permissions.iter().any(|p| p.grants(resource, action)))
        .map(|r| r.name.clone())
        .collect();

    let granted = !granting_roles.is_empty();
    let reason = if granted {
        format!("Granted '{}' by role(s) {:?}", required_permission, granting_roles)
    } else if user.roles.is_empty() {
        "User holds no roles and therefore no permissions".to_string()
    } else {
        format!(
            "None of the user's roles grants '{}'. Current permissions: {:?}",
            required_permission, effective
        )
    };

    AuthorizationExplanation {
        required_permission,
        granted,
        reason,
        user_id: Some(user.id),
        roles: user.role_names().map(str::to_string).collect(),
        effective_permissions: effective,
        granting_roles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Permission, Role};
    use proptest::prelude::*;

    fn editor() -> User {
        User::new("ed", "ed@example.com").with_roles([
            Role::new("editor").with_permissions([
                Permission::new("users.read", "users", Action::Read),
                Permission::new("content.write", "content", Action::Write),
            ]),
            Role::new("support").with_permissions([Permission::new(
                "tickets.execute",
                "tickets",
                Action::Execute,
            )]),
        ])
    }

    #[test]
    fn has_role_is_exact_and_case_sensitive() {
        let user = editor();
        assert!(has_role("editor", Some(&user)));
        assert!(has_role("support", Some(&user)));
        assert!(!has_role("Editor", Some(&user)));
        assert!(!has_role("admin", Some(&user)));
        assert!(!has_role("editor", None));
    }

    #[test]
    fn partial_permission_match_is_denied() {
        let user = editor();
        assert!(has_permission("users", &Action::Read, Some(&user)));
        assert!(!has_permission("users", &Action::Write, Some(&user)));
        assert!(!has_permission("content", &Action::Read, Some(&user)));
        assert!(has_permission("tickets", &Action::Execute, Some(&user)));
        assert!(!has_permission("users", &Action::Read, None));
    }

    #[test]
    fn permission_name_is_not_used_for_matching() {
        let user = User::new("x", "x@example.com").with_roles([Role::new("odd")
            .with_permissions([Permission::new("users.read", "billing", Action::Write)])]);

        assert!(!has_permission("users", &Action::Read, Some(&user)));
        assert!(has_permission("billing", &Action::Write, Some(&user)));
    }

    #[test]
    fn user_without_roles_has_nothing() {
        let user = User::new("empty", "empty@example.com");
        assert!(!has_role("user", Some(&user)));
        assert!(effective_permissions(&user).is_empty());
        assert_eq!(
            require_permission("users", &Action::Read, Some(&user)),
            Err(AuthError::forbidden("missing permission 'users.read'"))
        );
    }

    #[test]
    fn require_without_user_is_unauthenticated() {
        assert_eq!(require_role("admin", None), Err(AuthError::Unauthenticated));
        assert_eq!(
            require_permission("users", &Action::Read, None),
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(require_role("editor", Some(&editor())), Ok(()));
    }

    #[test]
    fn explanation_names_granting_roles() {
        let user = editor();
        let granted = explain_permission("tickets", &Action::Execute, Some(&user));
        assert!(granted.granted);
        assert_eq!(granted.granting_roles, vec!["support".to_string()]);
        assert_eq!(granted.effective_permissions.len(), 3);

        let denied = explain_permission("roles", &Action::Delete, Some(&user));
        assert!(!denied.granted);
        assert!(denied.granting_roles.is_empty());
        assert_eq!(denied.required_permission, "roles.delete");

        let anonymous = explain_permission("roles", &Action::Read, None);
        assert!(!anonymous.granted);
        assert!(anonymous.user_id.is_none());
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Read),
            Just(Action::Write),
            Just(Action::Delete),
            Just(Action::Execute),
            "[a-z]{1,6}".prop_map(Action::from),
        ]
    }

    fn user_strategy() -> impl Strategy<Value = User> {
        let perm = ("[a-z]{1,5}", action_strategy())
            .prop_map(|(res, act)| Permission::new(format!("{res}.{act}"), res, act));
        let role = ("[a-zA-Z]{1,6}", prop::collection::vec(perm, 0..5))
            .prop_map(|(name, perms)| Role::new(name).with_permissions(perms));
        prop::collection::vec(role, 0..5)
            .prop_map(|roles| User::new("prop", "prop@example.com").with_roles(roles))
    }

    proptest! {
        #[test]
        fn has_role_matches_role_names(user in user_strategy(), name in "[a-zA-Z]{1,6}") {
            let expected = user.roles.iter().any(|r| r.name == name);
            prop_assert_eq!(has_role(&name, Some(&user)), expected);
        }

        #[test]
        fn has_permission_matches_exact_pairs(
            user in user_strategy(),
            resource in "[a-z]{1,5}",
            action in action_strategy(),
        ) {
            let expected = user.roles.iter().any(|r| {
                r.permissions.iter().any(|p| p.resource == resource && p.action == action)
            });
            prop_assert_eq!(has_permission(&resource, &action, Some(&user)), expected);
            prop_assert_eq!(
                effective_permissions(&user).contains(&(resource.clone(), action.clone())),
                expected
            );
        }
    }
}
