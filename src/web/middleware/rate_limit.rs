//! Rate limiting middleware.
//!
//! Login routes get a tight per-IP quota so credential stuffing is throttled
//! at the transport seam; the rest of the API shares a looser quota.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State for rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP rate limiters for login routes.
    login_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Per-IP rate limiters for the general API.
    api_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Login attempts allowed per minute per IP.
    login_rate_limit: u32,
    /// API requests allowed per minute per IP.
    api_rate_limit: u32,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(login_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login_limiters: Arc::new(RwLock::new(HashMap::new())),
            api_limiters: Arc::new(RwLock::new(HashMap::new())),
            login_rate_limit,
            api_rate_limit,
        }
    }

    fn get_or_create_limiter(
        limiters: &RwLock<HashMap<String, Arc<IpRateLimiter>>>,
        ip: &str,
        requests_per_minute: u32,
    ) -> Arc<IpRateLimiter> {
        {
            let read_guard = limiters.read().unwrap();
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = limiters.write().unwrap();

        // Double-check after acquiring the write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check whether a login attempt is allowed for this IP.
    pub fn check_login(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.login_limiters, ip, self.login_rate_limit);
        limiter.check().is_ok()
    }

    /// Check whether a general API request is allowed for this IP.
    pub fn check_api(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.api_limiters, ip, self.api_rate_limit);
        limiter.check().is_ok()
    }

    /// Drop limiters no longer referenced by in-flight requests.
    pub fn cleanup(&self) {
        let mut login_guard = self.login_limiters.write().unwrap();
        login_guard.retain(|_, v| Arc::strong_count(v) > 1);

        let mut api_guard = self.api_limiters.write().unwrap();
        api_guard.retain(|_, v| Arc::strong_count(v) > 1);
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Extract the client IP from a request.
fn get_client_ip(req: &Request<Body>) -> String {
    // X-Forwarded-For first (reverse proxy), taking the first hop
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for login routes.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_login(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts. Please try again later.",
        )
            .into_response();
    }

    next.run(req).await
}

/// Rate limiting middleware for the general API.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_api(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        )
            .into_response();
    }

    next.run(req).await
}
