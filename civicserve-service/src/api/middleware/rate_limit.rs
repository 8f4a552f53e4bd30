//! Per-client request throttling.
//!
//! Fixed one-second windows with a burst allowance on top of the base
//! rate, keyed by peer IP. Entries idle past the TTL are swept on a
//! cleanup cadence so the map cannot grow without bound.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;

use civicserve_core::foundation::{
    RATE_LIMIT_CLEANUP_INTERVAL_SECS, RATE_LIMIT_ENTRY_TTL_SECS, RATE_LIMIT_WINDOW_SECS,
};

use crate::api::state::ApiState;

struct BucketState {
    window_start: Instant,
    window_count: u32,
    burst_count: u32,
    last_seen: Instant,
}

struct RateLimiterState {
    per_client: HashMap<IpAddr, BucketState>,
    last_cleanup: Instant,
}

pub struct RateLimiter {
    inner: Mutex<RateLimiterState>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            inner: Mutex::new(RateLimiterState {
                per_client: HashMap::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    /// Whether `client` may proceed at `now`. `rps` requests fit in each
    /// window; `burst` more are tolerated before the client is throttled.
    pub fn allow(&self, now: Instant, client: IpAddr, rps: u32, burst: u32) -> bool {
        // A poisoned lock fails closed.
        let Ok(mut state) = self.inner.lock() else {
            return false;
        };

        if now.duration_since(state.last_cleanup).as_secs() >= RATE_LIMIT_CLEANUP_INTERVAL_SECS {
            state
                .per_client
                .retain(|_, bucket| {
                    now.duration_since(bucket.last_seen).as_secs() < RATE_LIMIT_ENTRY_TTL_SECS
                });
            state.last_cleanup = now;
        }

        let bucket = state.per_client.entry(client).or_insert_with(|| BucketState {
            window_start: now,
            window_count: 0,
            burst_count: 0,
            last_seen: now,
        });
        bucket.last_seen = now;

        if now.duration_since(bucket.window_start).as_secs() >= RATE_LIMIT_WINDOW_SECS {
            bucket.window_start = now;
            bucket.window_count = 0;
            bucket.burst_count = 0;
        }

        if bucket.window_count < rps {
            bucket.window_count += 1;
            return true;
        }
        if bucket.burst_count < burst {
            bucket.burst_count += 1;
            return true;
        }
        false
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let allowed = state.rate_limiter.allow(
        Instant::now(),
        addr.ip(),
        state.rate_limit_rps,
        state.rate_limit_burst,
    );
    if !allowed {
        warn!("rate limit exceeded client={}", addr.ip());
        let body = serde_json::json!({
            "error": { "code": "rate_limited", "message": "rate limit exceeded" }
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    next.run(req).await
}
