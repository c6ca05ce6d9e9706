//! Rate limiting for public submissions.
//!
//! Visitors are anonymous, so limits are keyed by client address.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{net::SocketAddr, num::NonZeroU32};

use crate::app::AppState;

type ClientRateLimiter = GovRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Per-client limiter shared across all requests.
pub struct RateLimiterState {
    limiter: ClientRateLimiter,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is zero, which disables limiting.
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: GovRateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute,
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Ok if allowed, otherwise the retry delay in seconds (at least 1).
    pub fn check(&self, client: &str) -> Result<(), u64> {
        match self.limiter.check_key(&client.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.clock.now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    /// Drops clients whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Client identity for rate limiting.
///
/// Prefers the first `X-Forwarded-For` hop, since the service runs behind a
/// proxy, then the socket peer.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Client key for a request, read from its headers and connection info.
pub fn request_client_key(req: &Request<Body>) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_key(req.headers(), peer)
}

/// Checks the shared limiter for a client. `Err` carries the 429 response.
pub fn enforce(state: &AppState, client: &str) -> Result<(), Response> {
    let Some(limiter) = state.rate_limiter.as_deref() else {
        return Ok(());
    };
    limiter.check(client).map_err(|retry_after| {
        tracing::warn!(client = %client, retry_after, "RSVP rate limit exceeded");
        rate_limited_response(limiter.rate_limit_per_minute(), retry_after)
    })
}

/// Middleware that limits requests per client address.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = request_client_key(&req);
    if let Err(response) = enforce(&state, &client) {
        return response;
    }
    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
pub fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
