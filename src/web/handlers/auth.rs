//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::db::{NewUser, UserRepository, WhitelistRepository};
use crate::web::dto::{
    AdminLoginRequest, AdminLoginResponse, ApiResponse, LoginRequest, RegisterRequest,
    UserProjection, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{
    clear_session_cookie, session_cookie, CurrentUser, SessionKeys,
};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session token keys.
    pub keys: SessionKeys,
    /// Session lifetime in seconds.
    pub session_ttl: u64,
    /// Whether session cookies are marked Secure.
    pub cookie_secure: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, session_secret: &str, session_ttl: u64, cookie_secure: bool) -> Self {
        Self {
            db,
            keys: SessionKeys::new(session_secret),
            session_ttl,
            cookie_secure,
        }
    }

    /// Issue a session cookie for a user.
    fn issue_session(&self, user: &crate::db::User) -> Result<axum_extra::extract::cookie::Cookie<'static>, ApiError> {
        let token = self.keys.issue(user, self.session_ttl)?;
        Ok(session_cookie(token, self.cookie_secure))
    }
}

/// POST /api/auth/login - Staff/student login.
///
/// Staff identify by email, students by student ID. Unknown identifier and
/// wrong password produce the identical generic 401.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled"),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserProjection>>), ApiError> {
    if !req.has_identifier() {
        return Err(ApiError::bad_request("An email or student ID is required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = if let Some(email) = req.email.as_deref() {
        repo.get_by_email(email).await.map_err(ApiError::from)?
    } else if let Some(student_id) = req.student_id.as_deref() {
        repo.get_by_student_id(student_id)
            .await
            .map_err(ApiError::from)?
    } else {
        None
    };

    let user = user.ok_or_else(ApiError::invalid_credentials)?;

    crate::verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::invalid_credentials())?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let cookie = state.issue_session(&user)?;

    if let Err(e) = repo.update_last_login(user.id).await {
        tracing::warn!(user_id = user.id, "Failed to update last login: {}", e);
    }

    tracing::info!(user_id = user.id, role = %user.role, "Login");

    Ok((
        jar.add(cookie),
        Json(ApiResponse::new(UserProjection::from(&user))),
    ))
}

/// POST /api/auth/admin-login - Admin login.
///
/// Requires the admin role AND a whitelisted email; the whitelist is checked
/// on every login, so removal takes effect immediately.
#[utoipa::path(
    post,
    path = "/auth/admin-login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Not an admin or not whitelisted"),
    )
)]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<AdminLoginRequest>,
) -> Result<(CookieJar, Json<AdminLoginResponse>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_email(&req.email)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::invalid_credentials)?;

    crate::verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::invalid_credentials())?;

    if !user.role.is_admin() {
        return Err(ApiError::forbidden("Not authorized for admin access"));
    }

    let whitelist = WhitelistRepository::new(state.db.pool());
    if !whitelist.contains(&user.email).await.map_err(ApiError::from)? {
        tracing::warn!(email = %user.email, "Admin login attempt by non-whitelisted email");
        return Err(ApiError::forbidden("Not authorized for admin access"));
    }

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let cookie = state.issue_session(&user)?;

    if let Err(e) = repo.update_last_login(user.id).await {
        tracing::warn!(user_id = user.id, "Failed to update last login: {}", e);
    }

    tracing::info!(user_id = user.id, "Admin login");

    Ok((
        jar.add(cookie),
        Json(AdminLoginResponse::new(UserProjection::from(&user))),
    ))
}

/// POST /api/auth/register - Student self-registration.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, session cookie set"),
        (status = 409, description = "Email or student ID already in use"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserProjection>>), ApiError> {
    crate::validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let repo = UserRepository::new(state.db.pool());

    if repo.email_exists(&req.email).await.map_err(ApiError::from)? {
        return Err(ApiError::conflict("Email is already registered"));
    }
    if repo
        .get_by_student_id(&req.student_id)
        .await
        .map_err(ApiError::from)?
        .is_some()
    {
        return Err(ApiError::conflict("Student ID is already registered"));
    }

    let password_hash =
        crate::hash_password(&req.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = repo
        .create(
            &NewUser::new(&req.name, &req.email, password_hash)
                .with_student_id(&req.student_id),
        )
        .await
        .map_err(ApiError::from)?;

    let cookie = state.issue_session(&user)?;

    tracing::info!(user_id = user.id, "Student registered");

    Ok((
        jar.add(cookie),
        Json(ApiResponse::new(UserProjection::from(&user))),
    ))
}

/// POST /api/auth/logout - Clear the session.
///
/// Sessions are stateless, so logout is purely a cookie removal.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Session cleared"))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(clear_session_cookie(state.cookie_secure)),
        Json(serde_json::json!({ "success": true })),
    )
}

/// GET /api/auth/me - Resolve the current identity.
///
/// The projection is built from the freshly loaded user row, so role or
/// permission changes made since login are already reflected.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user projection"),
        (status = 401, description = "No valid session"),
    )
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<UserProjection>> {
    Json(ApiResponse::new(UserProjection::from(&user)))
}
