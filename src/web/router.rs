//! Router configuration for the Web API.
//!
//! Authorization is declared here, once per route group: each protected
//! group carries a [`Requirement`] extension consumed by the `authorize`
//! middleware. Handlers never check roles themselves.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{Permission, Requirement};

use super::handlers::{
    add_to_whitelist, admin_login, list_staff, list_whitelist, login, logout, me, provision_staff,
    publish_result, record_attendance, register, remove_from_whitelist, update_permissions,
    update_role, AppState,
};
use super::middleware::{
    api_rate_limit, authorize, create_cors_layer, login_rate_limit, security_headers,
    RateLimitState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // Credential-accepting routes share the tight login quota
    let rate_limit_for_login = rate_limit.clone();
    let auth_public_routes = Router::new()
        .route("/login", post(login))
        .route("/admin-login", post(admin_login))
        .route("/register", post(register))
        .route_layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_for_login.clone();
            login_rate_limit(state, req, next)
        }))
        .route("/logout", post(logout));

    let auth_protected_routes = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            authorize,
        ))
        .route_layer(Extension(Requirement::authenticated()));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    // Staff and whitelist management are admin-only
    let staff_routes = Router::new()
        .route("/", get(list_staff).post(provision_staff))
        .route("/:id/permissions", put(update_permissions))
        .route("/:id/role", put(update_role))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            authorize,
        ))
        .route_layer(Extension(Requirement::admin()));

    let admin_routes = Router::new()
        .route("/whitelist", get(list_whitelist).post(add_to_whitelist))
        .route("/whitelist/:email", delete(remove_from_whitelist))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            authorize,
        ))
        .route_layer(Extension(Requirement::admin()));

    // Record routes compose a staff-class role with a capability tag
    let attendance_routes = Router::new()
        .route("/attendance", post(record_attendance))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            authorize,
        ))
        .route_layer(Extension(
            Requirement::staff_or_admin().with_permission(Permission::TakeAttendance),
        ));

    let result_routes = Router::new()
        .route("/results", post(publish_result))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            authorize,
        ))
        .route_layer(Extension(
            Requirement::staff_or_admin().with_permission(Permission::ManageResults),
        ));

    let record_routes = Router::new()
        .merge(attendance_routes)
        .merge(result_routes);

    // Everything under /api shares the general per-IP quota; the login
    // quota above draws from its own budget
    let rate_limit_for_api = rate_limit.clone();
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/staff", staff_routes)
        .nest("/admin", admin_routes)
        .nest("/records", record_routes)
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_for_api.clone();
            api_rate_limit(state, req, next)
        }));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(title = "Campus API", description = "School back-office REST API"),
    paths(
        super::handlers::auth::login,
        super::handlers::auth::admin_login,
        super::handlers::auth::register,
        super::handlers::auth::logout,
        super::handlers::auth::me,
        super::handlers::staff::list_staff,
        super::handlers::staff::provision_staff,
        super::handlers::staff::update_permissions,
        super::handlers::staff::update_role,
        super::handlers::admin::list_whitelist,
        super::handlers::admin::add_to_whitelist,
        super::handlers::admin::remove_from_whitelist,
        super::handlers::records::record_attendance,
        super::handlers::records::publish_result,
    ),
    components(schemas(
        crate::web::dto::LoginRequest,
        crate::web::dto::AdminLoginRequest,
        crate::web::dto::RegisterRequest,
        crate::web::dto::ProvisionStaffRequest,
        crate::web::dto::UpdatePermissionsRequest,
        crate::web::dto::UpdateRoleRequest,
        crate::web::dto::WhitelistRequest,
        crate::web::dto::RecordAttendanceRequest,
        crate::web::dto::PublishResultRequest,
        crate::web::dto::UserProjection,
        crate::web::dto::AttendanceResponse,
        crate::web::dto::ResultResponse,
        crate::web::dto::WhitelistResponse,
    ))
)]
pub struct ApiDoc;

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
