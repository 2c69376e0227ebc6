//! Closed catalog of the role and menu identifiers the UI knows about.
//!
//! Purely descriptive: labels, icons, colors and the menus each role is
//! expected to see. Nothing here grants access; the server's menu-access
//! response is authoritative.

use core::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} identifier '{value}'")]
pub struct UnknownIdentifier {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuId {
    Dashboard,
    AdminPanel,
    Analytics,
    Reports,
    Admin,
    Users,
    Roles,
    Audit,
    Billing,
    Support,
    Settings,
}

impl MenuId {
    pub const ALL: [MenuId; 11] = [
        MenuId::Dashboard,
        MenuId::AdminPanel,
        MenuId::Analytics,
        MenuId::Reports,
        MenuId::Admin,
        MenuId::Users,
        MenuId::Roles,
        MenuId::Audit,
        MenuId::Billing,
        MenuId::Support,
        MenuId::Settings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MenuId::Dashboard => "dashboard",
            MenuId::AdminPanel => "admin-panel",
            MenuId::Analytics => "analytics",
            MenuId::Reports => "reports",
            MenuId::Admin => "admin",
            MenuId::Users => "users",
            MenuId::Roles => "roles",
            MenuId::Audit => "audit",
            MenuId::Billing => "billing",
            MenuId::Support => "support",
            MenuId::Settings => "settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuId::Dashboard => "Dashboard",
            MenuId::AdminPanel => "Admin Panel",
            MenuId::Analytics => "Analytics",
            MenuId::Reports => "Reports",
            MenuId::Admin => "Administration",
            MenuId::Users => "User Management",
            MenuId::Roles => "Role Management",
            MenuId::Audit => "Audit Logs",
            MenuId::Billing => "Billing",
            MenuId::Support => "Support",
            MenuId::Settings => "Settings",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MenuId::Dashboard => "Home",
            MenuId::AdminPanel | MenuId::Roles => "Shield",
            MenuId::Analytics => "BarChart3",
            MenuId::Reports => "FileText",
            MenuId::Admin => "Settings",
            MenuId::Users => "Users",
            MenuId::Audit => "Clock",
            MenuId::Billing => "CreditCard",
            MenuId::Support => "HelpCircle",
            MenuId::Settings => "Cog",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            MenuId::Dashboard => "/dashboard",
            MenuId::AdminPanel | MenuId::Admin => "/admin",
            MenuId::Analytics => "/analytics",
            MenuId::Reports => "/reports",
            MenuId::Users => "/admin/users",
            MenuId::Roles => "/admin/roles",
            MenuId::Audit => "/admin/audit",
            MenuId::Billing => "/billing",
            MenuId::Support => "/support",
            MenuId::Settings => "/settings",
        }
    }

    /// The permission name the server checks for this entry.
    pub fn permission(self) -> String {
        format!("menu.{}", self.name())
    }
}

impl FromStr for MenuId {
    type Err = UnknownIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MenuId::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownIdentifier {
                kind: "menu",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleColor {
    Red,
    Blue,
    Green,
    Gray,
    Purple,
    Yellow,
    /// Shown for roles outside the catalog.
    Neutral,
}

impl RoleColor {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleColor::Red => "red",
            RoleColor::Blue => "blue",
            RoleColor::Green => "green",
            RoleColor::Gray => "gray",
            RoleColor::Purple => "purple",
            RoleColor::Yellow => "yellow",
            RoleColor::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnownRole {
    Admin,
    Manager,
    Editor,
    Viewer,
    Support,
    User,
}

impl KnownRole {
    pub const ALL: [KnownRole; 6] = [
        KnownRole::Admin,
        KnownRole::Manager,
        KnownRole::Editor,
        KnownRole::Viewer,
        KnownRole::Support,
        KnownRole::User,
    ];

    /// Role name as stored on the server.
    pub fn name(self) -> &'static str {
        match self {
            KnownRole::Admin => "admin",
            KnownRole::Manager => "manager",
            KnownRole::Editor => "editor",
            KnownRole::Viewer => "viewer",
            KnownRole::Support => "support",
            KnownRole::User => "user",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KnownRole::Admin => "Administrator",
            KnownRole::Manager => "Manager",
            KnownRole::Editor => "Editor",
            KnownRole::Viewer => "Viewer",
            KnownRole::Support => "Support Staff",
            KnownRole::User => "User",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            KnownRole::Admin => "Full system access including admin panel",
            KnownRole::Manager => "Business analytics access",
            KnownRole::Editor => "Content management access",
            KnownRole::Viewer => "Read-only access",
            KnownRole::Support => "User assistance access",
            KnownRole::User => "Basic dashboard access",
        }
    }

    pub fn color(self) -> RoleColor {
        match self {
            KnownRole::Admin => RoleColor::Red,
            KnownRole::Manager => RoleColor::Blue,
            KnownRole::Editor => RoleColor::Green,
            KnownRole::Viewer => RoleColor::Gray,
            KnownRole::Support => RoleColor::Purple,
            KnownRole::User => RoleColor::Yellow,
        }
    }

    /// Menus this role is expected to see. Documentation and test fixtures
    /// only; never consulted to grant navigation.
    pub fn expected_menus(self) -> &'static [MenuId] {
        match self {
            KnownRole::Admin => &[
                MenuId::Dashboard,
                MenuId::Analytics,
                MenuId::Reports,
                MenuId::Admin,
                MenuId::AdminPanel,
                MenuId::Billing,
                MenuId::Support,
                MenuId::Settings,
            ],
            KnownRole::Manager => &[
                MenuId::Dashboard,
                MenuId::Analytics,
                MenuId::Reports,
                MenuId::Billing,
            ],
            KnownRole::Editor => &[MenuId::Dashboard, MenuId::Users, MenuId::Support],
            KnownRole::Viewer => &[MenuId::Dashboard, MenuId::Analytics, MenuId::Reports],
            KnownRole::Support => &[MenuId::Dashboard, MenuId::Support, MenuId::Users],
            KnownRole::User => &[MenuId::Dashboard],
        }
    }
}

impl FromStr for KnownRole {
    type Err = UnknownIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownRole::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownIdentifier {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Badge color for a role name as received from the server.
///
/// Roles outside the catalog render neutrally and are reported, so a new
/// server-side role shows up in the logs instead of silently borrowing
/// another role's styling.
pub fn role_color(name: &str) -> RoleColor {
    match name.parse::<KnownRole>() {
        Ok(role) => role.color(),
        Err(err) => {
            tracing::warn!(role = name, "{err}; rendering with neutral color");
            RoleColor::Neutral
        }
    }
}
