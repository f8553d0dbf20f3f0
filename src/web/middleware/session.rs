//! Session token middleware.
//!
//! Sessions are signed JWTs carried in an HTTP-only cookie. The token is the
//! only client-side state; authorization decisions always re-read the user
//! row so permission and role changes take effect mid-session.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::{User, UserRepository};
use crate::web::error::ApiError;
use crate::Database;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "campus_session";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Role at issue time. Informational; authorization re-reads the user.
    pub role: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// Token ID (unique per session).
    pub jti: String,
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    /// Encoding key for issuing tokens.
    pub encoding_key: EncodingKey,
    /// Decoding key for verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl SessionKeys {
    /// Create session keys from a shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user: &User, ttl_secs: u64) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = SessionClaims {
            sub: user.id,
            role: user.role.to_string(),
            iat: now,
            exp: now + ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {}", e);
            ApiError::internal("Failed to create session")
        })
    }

    /// Decode and verify a session token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token validation failed: {}", e);
                ApiError::unauthenticated()
            })
    }
}

/// Build the session cookie carrying a freshly issued token.
///
/// HTTP-only so scripts never see the token; expiry is enforced by the
/// token's own `exp` claim rather than cookie Max-Age.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Build an expired session cookie, clearing the session on the client.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

/// Resolve the authenticated user behind a request's session cookie.
///
/// Verifies the token, then fetches the user row by ID. The stored row is
/// authoritative for role and permissions; the token only proves identity.
pub async fn resolve_identity(
    db: &Database,
    keys: &SessionKeys,
    jar: &CookieJar,
) -> Result<User, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(ApiError::unauthenticated)?;

    let claims = keys.verify(&token)?;

    let repo = UserRepository::new(db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::unauthenticated)?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    Ok(user)
}
