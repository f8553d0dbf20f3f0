//! Middleware for the Web API.

pub mod authorize;
pub mod cors;
pub mod rate_limit;
pub mod security;
pub mod session;

pub use authorize::{authorize, CurrentUser};
pub use cors::create_cors_layer;
pub use rate_limit::{api_rate_limit, login_rate_limit, RateLimitState};
pub use security::security_headers;
pub use session::{
    clear_session_cookie, resolve_identity, session_cookie, SessionClaims, SessionKeys,
    SESSION_COOKIE,
};
