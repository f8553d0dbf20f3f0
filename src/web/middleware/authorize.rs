//! Route authorization middleware.
//!
//! Every protected route group declares a [`Requirement`] and is wrapped by
//! [`authorize`]. The middleware resolves the session, evaluates the
//! requirement against the freshly loaded user, and injects [`CurrentUser`]
//! for the handler. Handlers never re-check roles themselves.

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{Access, Requirement};
use crate::db::User;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::session::resolve_identity;

/// The authenticated user for the current request.
///
/// Inserted by [`authorize`]; extract it in handlers that sit behind the
/// middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| ApiError::internal("Authorization middleware not applied"))
        })
    }
}

/// Authorization middleware.
///
/// Reads the [`Requirement`] attached to the route, resolves the session
/// cookie to a user, and rejects with 401 (no valid session) or 403
/// (insufficient role or permission) before the handler runs.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Extension(requirement): Extension<Requirement>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_identity(&state.db, &state.keys, &jar).await?;

    match requirement.check(&user) {
        Access::Granted => {}
        Access::DeniedRole => {
            tracing::warn!(
                user_id = user.id,
                role = %user.role,
                path = %request.uri().path(),
                "Role not permitted"
            );
            return Err(ApiError::forbidden("Insufficient role"));
        }
        Access::DeniedPermission => {
            tracing::warn!(
                user_id = user.id,
                role = %user.role,
                path = %request.uri().path(),
                "Missing required permission"
            );
            return Err(ApiError::forbidden("Missing required permission"));
        }
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
