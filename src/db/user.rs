//! User model for the campus server.
//!
//! Defines the User entity, the closed Role enum, and the builder types
//! used by the repository.

use std::fmt;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::auth::Permission;

/// User role.
///
/// Roles are parallel identity classes, not a privilege ladder: a principal
/// does not subsume a teacher. Only `admin` is special - it implicitly
/// carries every permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Site administrator.
    Admin,
    /// Classroom teacher.
    Teacher,
    /// School principal.
    Principal,
    /// Vice principal.
    VicePrincipal,
    /// Academic coordinator.
    Coordinator,
    /// Non-teaching staff.
    Staff,
    /// Enrolled student.
    #[default]
    Student,
}

impl Role {
    /// Convert role to its wire/database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Principal => "principal",
            Role::VicePrincipal => "vice_principal",
            Role::Coordinator => "coordinator",
            Role::Staff => "staff",
            Role::Student => "student",
        }
    }

    /// Whether this role belongs to the staff class (teaching or
    /// administrative school personnel, excluding the site admin).
    pub fn is_staff_class(&self) -> bool {
        matches!(
            self,
            Role::Teacher | Role::Principal | Role::VicePrincipal | Role::Coordinator | Role::Staff
        )
    }

    /// Whether this role is the site administrator.
    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "principal" => Ok(Role::Principal),
            "vice_principal" => Ok(Role::VicePrincipal),
            "coordinator" => Ok(Role::Coordinator),
            "staff" => Ok(Role::Staff),
            "student" => Ok(Role::Student),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// User entity representing an account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2 PHC string).
    pub password: String,
    /// Account role.
    pub role: Role,
    /// Granted capability tags. Empty for most accounts; admin needs none.
    pub permissions: Vec<Permission>,
    /// Student identifier, present only for student accounts.
    pub student_id: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp (optional).
    pub last_login: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
}

impl User {
    /// Whether this user holds the given capability.
    ///
    /// Admin implicitly holds every capability.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role == Role::Admin || self.permissions.contains(&permission)
    }
}

fn decode_error(
    column: &str,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: source.into(),
    }
}

impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let role_str: String = row.try_get("role")?;
        let role = role_str
            .parse::<Role>()
            .map_err(|e| decode_error("role", e))?;

        // Permissions are stored as a JSON array of tags
        let permissions_json: String = row.try_get("permissions")?;
        let permissions: Vec<Permission> = serde_json::from_str(&permissions_json)
            .map_err(|e| decode_error("permissions", e))?;

        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role,
            permissions,
            student_id: row.try_get("student_id")?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password hash (must be pre-hashed with Argon2).
    pub password: String,
    /// Account role (defaults to Student).
    pub role: Role,
    /// Granted capability tags.
    pub permissions: Vec<Permission>,
    /// Student identifier (optional).
    pub student_id: Option<String>,
}

impl NewUser {
    /// Create a new user with minimal required fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: Role::Student,
            permissions: vec![],
            student_id: None,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the granted permissions.
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set the student identifier.
    pub fn with_student_id(mut self, student_id: impl Into<String>) -> Self {
        self.student_id = Some(student_id.into());
        self
    }
}

/// Data for updating an existing user.
///
/// Only fields that are set will be modified.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New password hash (if changing password).
    pub password: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New permission set (replaces the stored set).
    pub permissions: Option<Vec<Permission>>,
    /// New active status.
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new password hash.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set new display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set new role.
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Replace the permission set.
    pub fn permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Set active status.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.permissions.is_none()
            && self.is_active.is_none()
    }
}
