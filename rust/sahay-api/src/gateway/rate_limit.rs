//! Rate limiting middleware using governor.
//!
//! Two quotas: a per-client quota on the chat endpoint and a coarse
//! global quota across all routes. Limiters live in [`AppState`] rather
//! than statics so every app instance (and every test) gets its own.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use parking_lot::Mutex;
use serde::Serialize;

use crate::AppState;
use crate::config::GatewayConfig;

/// Direct (unkeyed) rate limiter type alias.
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

fn nonzero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Per-client rate limiters using a simple in-memory map.
pub struct KeyedRateLimiters {
    limiters: Mutex<HashMap<String, Arc<DirectRateLimiter>>>,
    quota: Quota,
}

impl KeyedRateLimiters {
    /// Create a new keyed limiter collection.
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        let quota = Quota::per_minute(nonzero(requests_per_minute)).allow_burst(nonzero(burst));

        Self {
            limiters: Mutex::new(HashMap::new()),
            quota,
        }
    }

    /// Get or create a rate limiter for a client key.
    pub fn get_or_create(&self, key: &str) -> Arc<DirectRateLimiter> {
        let mut limiters = self.limiters.lock();

        if let Some(limiter) = limiters.get(key) {
            return Arc::clone(limiter);
        }

        let limiter = Arc::new(RateLimiter::direct(self.quota));
        limiters.insert(key.to_string(), Arc::clone(&limiter));
        limiter
    }
}

/// The limiter set shared through [`AppState`].
pub struct RateLimits {
    global: DirectRateLimiter,
    per_client: KeyedRateLimiters,
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits").finish_non_exhaustive()
    }
}

impl RateLimits {
    /// Build the limiters from gateway configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        let global_quota = Quota::per_hour(nonzero(config.global_rate_limit_per_hour));

        Self {
            global: RateLimiter::direct(global_quota),
            per_client: KeyedRateLimiters::new(
                config.chat_rate_limit_per_minute,
                config.rate_limit_burst,
            ),
        }
    }
}

/// Rate limit error response.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitError {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Seconds until the quota refills.
    pub retry_after_secs: Option<u64>,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let status = StatusCode::TOO_MANY_REQUESTS;
        let retry_after = self.retry_after_secs;
        let body = Json(self);

        let mut response = (status, body).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}

/// Global rate limiting middleware, applied to every route.
pub async fn global_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    match state.limits.global.check() {
        Ok(_) => Ok(next.run(req).await),
        Err(not_until) => {
            let wait = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()));
            Err(RateLimitError {
                error: "rate_limit_exceeded".to_string(),
                message: "Rate limit exceeded".to_string(),
                retry_after_secs: Some(wait.as_secs()),
            })
        }
    }
}

/// Per-client rate limiting for the chat endpoint; other routes pass
/// through untouched.
pub async fn chat_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    if req.uri().path() != "/chat" {
        return Ok(next.run(req).await);
    }

    let key = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "local".to_string());

    let limiter = state.limits.per_client.get_or_create(&key);

    match limiter.check() {
        Ok(_) => Ok(next.run(req).await),
        Err(not_until) => {
            let wait = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()));
            Err(RateLimitError {
                error: "rate_limit_exceeded".to_string(),
                message: "Rate limit exceeded".to_string(),
                retry_after_secs: Some(wait.as_secs()),
            })
        }
    }
}
