//! Admin whitelist management handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::WhitelistRepository;
use crate::web::dto::{ApiResponse, ValidatedJson, WhitelistRequest, WhitelistResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::CurrentUser;

/// GET /api/admin/whitelist - List whitelisted emails.
#[utoipa::path(
    get,
    path = "/admin/whitelist",
    tag = "admin",
    responses(
        (status = 200, description = "Whitelisted emails"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_whitelist(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<WhitelistResponse>>, ApiError> {
    let repo = WhitelistRepository::new(state.db.pool());
    let emails = repo.list().await.map_err(ApiError::from)?;

    Ok(Json(ApiResponse::new(WhitelistResponse { emails })))
}

/// POST /api/admin/whitelist - Add an email to the whitelist.
#[utoipa::path(
    post,
    path = "/admin/whitelist",
    tag = "admin",
    request_body = WhitelistRequest,
    responses(
        (status = 200, description = "Email whitelisted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 422, description = "Invalid email"),
    )
)]
pub async fn add_to_whitelist(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    ValidatedJson(req): ValidatedJson<WhitelistRequest>,
) -> Result<Json<ApiResponse<WhitelistResponse>>, ApiError> {
    let repo = WhitelistRepository::new(state.db.pool());
    repo.add(&req.email).await.map_err(ApiError::from)?;

    tracing::info!(admin_id = admin.id, email = %req.email, "Email whitelisted");

    let emails = repo.list().await.map_err(ApiError::from)?;
    Ok(Json(ApiResponse::new(WhitelistResponse { emails })))
}

/// DELETE /api/admin/whitelist/:email - Remove an email from the whitelist.
///
/// Takes effect on the next admin login; already-issued sessions are
/// untouched because sessions are stateless.
#[utoipa::path(
    delete,
    path = "/admin/whitelist/{email}",
    tag = "admin",
    responses(
        (status = 200, description = "Email removed"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Email was not whitelisted"),
    )
)]
pub async fn remove_from_whitelist(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<WhitelistResponse>>, ApiError> {
    let repo = WhitelistRepository::new(state.db.pool());
    let removed = repo.remove(&email).await.map_err(ApiError::from)?;

    if !removed {
        return Err(ApiError::not_found("Email was not whitelisted"));
    }

    tracing::info!(admin_id = admin.id, email = %email, "Email removed from whitelist");

    let emails = repo.list().await.map_err(ApiError::from)?;
    Ok(Json(ApiResponse::new(WhitelistResponse { emails })))
}
