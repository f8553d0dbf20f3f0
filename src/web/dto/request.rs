//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Staff/student login request.
///
/// Exactly one identifier is expected: staff authenticate by email,
/// students by student ID. Supplying neither is a validation error;
/// supplying both resolves by email.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Email address (staff accounts).
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Student ID (student accounts).
    #[serde(rename = "studentId")]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub student_id: Option<String>,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// Whether the request carries at least one identifier.
    pub fn has_identifier(&self) -> bool {
        self.email.is_some() || self.student_id.is_some()
    }
}

/// Admin login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    /// Email address.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Student self-registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    /// Email address.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password (complexity is checked separately).
    pub password: String,
    /// Student ID.
    #[serde(rename = "studentId")]
    #[validate(
        length(min = 1, max = 32, message = "Student ID must be 1-32 characters"),
        custom(function = "no_control_chars")
    )]
    pub student_id: String,
}

/// Staff account provisioning request (admin only).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProvisionStaffRequest {
    /// Display name.
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    /// Email address.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Staff role (teacher, principal, vice_principal, coordinator, staff).
    #[validate(custom(function = "not_empty_trimmed"))]
    pub role: String,
    /// Initial capability tags.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Permission grant/revoke request (admin only).
///
/// The supplied list replaces the user's permission set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePermissionsRequest {
    /// Capability tags, e.g. `["TAKE_ATTENDANCE"]`.
    pub permissions: Vec<String>,
}

/// Role change request (admin only).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    /// New role.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub role: String,
}

/// Admin whitelist entry request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WhitelistRequest {
    /// Email address to whitelist.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Attendance record request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceRequest {
    /// Student ID the record is for.
    #[serde(rename = "studentId")]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub student_id: String,
    /// ISO date (YYYY-MM-DD).
    #[validate(custom(function = "not_empty_trimmed"))]
    pub date: String,
    /// Attendance status: present, absent, or late.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub status: String,
}

/// Exam result publication request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PublishResultRequest {
    /// Student ID the result is for.
    #[serde(rename = "studentId")]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub student_id: String,
    /// Subject name.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub subject: String,
    /// Academic term.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub term: String,
    /// Score.
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be 0-100"))]
    pub score: f64,
}
