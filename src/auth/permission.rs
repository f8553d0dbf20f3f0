//! Role and permission authorization.
//!
//! This module is the single decision point for protected routes. A route
//! declares a [`Requirement`] (allowed roles and/or a required capability
//! tag) and [`Requirement::check`] produces an [`Access`] verdict from the
//! resolved identity. Handlers never re-implement these checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::{Role, User};

/// Fine-grained capability tags grantable to staff-class accounts.
///
/// The catalog is closed: unknown tags are rejected at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// Manage admission applications.
    #[serde(rename = "MANAGE_ADMISSION")]
    ManageAdmission,
    /// Manage fee records.
    #[serde(rename = "MANAGE_FEES")]
    ManageFees,
    /// Publish and edit exam results.
    #[serde(rename = "MANAGE_RESULTS")]
    ManageResults,
    /// Record student attendance.
    #[serde(rename = "TAKE_ATTENDANCE")]
    TakeAttendance,
    /// Manage learning resources.
    #[serde(rename = "MANAGE_RESOURCES")]
    ManageResources,
}

impl Permission {
    /// All permissions in the catalog.
    pub const ALL: [Permission; 5] = [
        Permission::ManageAdmission,
        Permission::ManageFees,
        Permission::ManageResults,
        Permission::TakeAttendance,
        Permission::ManageResources,
    ];

    /// Convert permission to its wire/database tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageAdmission => "MANAGE_ADMISSION",
            Permission::ManageFees => "MANAGE_FEES",
            Permission::ManageResults => "MANAGE_RESULTS",
            Permission::TakeAttendance => "TAKE_ATTENDANCE",
            Permission::ManageResources => "MANAGE_RESOURCES",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANAGE_ADMISSION" => Ok(Permission::ManageAdmission),
            "MANAGE_FEES" => Ok(Permission::ManageFees),
            "MANAGE_RESULTS" => Ok(Permission::ManageResults),
            "TAKE_ATTENDANCE" => Ok(Permission::TakeAttendance),
            "MANAGE_RESOURCES" => Ok(Permission::ManageResources),
            _ => Err(format!("unknown permission: {s}")),
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The identity satisfies the requirement.
    Granted,
    /// The identity's role is not in the route's allowed set.
    DeniedRole,
    /// The identity lacks the route's required permission.
    DeniedPermission,
}

/// Staff-class roles: everyone who works at the school except the admin.
pub const STAFF_ROLES: &[Role] = &[
    Role::Teacher,
    Role::Principal,
    Role::VicePrincipal,
    Role::Coordinator,
    Role::Staff,
];

/// Staff-class roles plus admin.
pub const STAFF_AND_ADMIN_ROLES: &[Role] = &[
    Role::Admin,
    Role::Teacher,
    Role::Principal,
    Role::VicePrincipal,
    Role::Coordinator,
    Role::Staff,
];

/// A route-level authorization requirement.
///
/// Role and permission constraints are independent and compose: a route may
/// require a staff-class role AND a specific capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct Requirement {
    /// Allowed roles, or None for any authenticated role.
    pub roles: Option<&'static [Role]>,
    /// Required capability tag, or None.
    pub permission: Option<Permission>,
}

impl Requirement {
    /// Require only a valid session, any role.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Require membership in a role set.
    pub fn roles(roles: &'static [Role]) -> Self {
        Self {
            roles: Some(roles),
            permission: None,
        }
    }

    /// Require the admin role.
    pub fn admin() -> Self {
        Self::roles(&[Role::Admin])
    }

    /// Require a staff-class role.
    pub fn staff() -> Self {
        Self::roles(STAFF_ROLES)
    }

    /// Require a staff-class role, also admitting admin.
    ///
    /// Routes gated this way usually compose a capability tag; admin passes
    /// the tag check implicitly.
    pub fn staff_or_admin() -> Self {
        Self::roles(STAFF_AND_ADMIN_ROLES)
    }

    /// Additionally require a capability tag.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Decide access for a resolved identity.
    ///
    /// Order matters: the role check runs before the permission check so a
    /// caller outside the allowed role set is always reported as a role
    /// denial. Admin implicitly holds every permission.
    pub fn check(&self, user: &User) -> Access {
        if let Some(allowed) = self.roles {
            if !allowed.contains(&user.role) {
                return Access::DeniedRole;
            }
        }

        if let Some(required) = self.permission {
            if !user.has_permission(required) {
                return Access::DeniedPermission;
            }
        }

        Access::Granted
    }
}
