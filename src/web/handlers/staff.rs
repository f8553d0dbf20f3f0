//! Staff account management handlers (admin only).

use axum::{
    extract::{Path, State},
    Json,
};
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::Permission;
use crate::db::{NewUser, Role, UserRepository};
use crate::web::dto::{
    ApiResponse, ProvisionStaffRequest, UpdatePermissionsRequest, UpdateRoleRequest,
    UserProjection, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

/// Parse capability tags, rejecting anything outside the catalog.
fn parse_permissions(tags: &[String]) -> Result<Vec<Permission>, ApiError> {
    let mut permissions = Vec::with_capacity(tags.len());
    for tag in tags {
        let permission = Permission::from_str(tag)
            .map_err(|_| ApiError::unprocessable(format!("Unknown permission: {}", tag)))?;
        if !permissions.contains(&permission) {
            permissions.push(permission);
        }
    }
    Ok(permissions)
}

/// Parse a staff-class role name.
///
/// The admin role is never assignable here; admin access is controlled by
/// the whitelist, not by staff management.
fn parse_staff_role(name: &str) -> Result<Role, ApiError> {
    let role =
        Role::from_str(name).map_err(|_| ApiError::unprocessable(format!("Unknown role: {}", name)))?;
    if !role.is_staff_class() {
        return Err(ApiError::unprocessable(format!(
            "Role is not assignable here: {}",
            name
        )));
    }
    Ok(role)
}

/// GET /api/staff - List active staff accounts.
#[utoipa::path(
    get,
    path = "/staff",
    tag = "staff",
    responses(
        (status = 200, description = "Staff accounts"),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_staff(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserProjection>>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let staff = repo.list_staff().await.map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(
        staff.iter().map(UserProjection::from).collect(),
    )))
}

/// POST /api/staff - Provision a staff account.
#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = ProvisionStaffRequest,
    responses(
        (status = 200, description = "Account created"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn provision_staff(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    ValidatedJson(req): ValidatedJson<ProvisionStaffRequest>,
) -> Result<Json<ApiResponse<UserProjection>>, ApiError> {
    let role = parse_staff_role(&req.role)?;
    let permissions = parse_permissions(&req.permissions)?;

    crate::validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let repo = UserRepository::new(state.db.pool());
    if repo.email_exists(&req.email).await.map_err(ApiError::from)? {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let password_hash =
        crate::hash_password(&req.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = repo
        .create(
            &NewUser::new(&req.name, &req.email, password_hash)
                .with_role(role)
                .with_permissions(permissions),
        )
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        role = %user.role,
        "Staff account provisioned"
    );

    Ok(Json(ApiResponse::new(UserProjection::from(&user))))
}

/// PUT /api/staff/:id/permissions - Replace a user's permission set.
///
/// Takes effect on the target's next request; no re-login is needed because
/// authorization always re-reads the stored row.
#[utoipa::path(
    put,
    path = "/staff/{id}/permissions",
    tag = "staff",
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Updated projection"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user"),
        (status = 422, description = "Unknown permission tag"),
    )
)]
pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdatePermissionsRequest>,
) -> Result<Json<ApiResponse<UserProjection>>, ApiError> {
    let permissions = parse_permissions(&req.permissions)?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .set_permissions(id, &permissions)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("No such user"))?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        permissions = ?req.permissions,
        "Permissions updated"
    );

    Ok(Json(ApiResponse::new(UserProjection::from(&user))))
}

/// PUT /api/staff/:id/role - Change a user's role.
///
/// Users can never change their own role; this route sits behind the admin
/// requirement, which is the only path to a role mutation.
#[utoipa::path(
    put,
    path = "/staff/{id}/role",
    tag = "staff",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated projection"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user"),
        (status = 422, description = "Unknown or unassignable role"),
    )
)]
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserProjection>>, ApiError> {
    let role = parse_staff_role(&req.role)?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .set_role(id, role)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("No such user"))?;

    tracing::info!(
        admin_id = admin.id,
        user_id = user.id,
        role = %user.role,
        "Role updated"
    );

    Ok(Json(ApiResponse::new(UserProjection::from(&user))))
}
