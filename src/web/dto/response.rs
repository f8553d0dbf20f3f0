//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::User;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always true; errors use a separate envelope.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Admin login response.
///
/// Admin logins report the account under a `user` key rather than `data`.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    /// Always true.
    pub success: bool,
    /// The authenticated admin account.
    pub user: UserProjection,
}

impl AdminLoginResponse {
    /// Create a new admin login response.
    pub fn new(user: UserProjection) -> Self {
        Self {
            success: true,
            user,
        }
    }
}

/// Public projection of a user account.
///
/// Never includes the password hash or any other credential material.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProjection {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: String,
    /// Capability tags.
    pub permissions: Vec<String>,
    /// Student ID (student accounts only).
    #[serde(rename = "studentId", skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl From<&User> for UserProjection {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            permissions: user
                .permissions
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            student_id: user.student_id.clone(),
        }
    }
}

/// Attendance record response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    /// Record ID.
    pub id: i64,
    /// Student ID.
    #[serde(rename = "studentId")]
    pub student_id: String,
    /// ISO date.
    pub date: String,
    /// Attendance status.
    pub status: String,
}

/// Exam result response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultResponse {
    /// Record ID.
    pub id: i64,
    /// Student ID.
    #[serde(rename = "studentId")]
    pub student_id: String,
    /// Subject name.
    pub subject: String,
    /// Academic term.
    pub term: String,
    /// Score.
    pub score: f64,
}

/// Whitelist listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct WhitelistResponse {
    /// Whitelisted email addresses.
    pub emails: Vec<String>,
}
