//! Request/response logging under the `http` target.
//!
//! Probe endpoints log at trace so they do not drown real traffic; error
//! responses are raised to warn/error. Sensitive header values are
//! redacted before they ever reach a log line.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, error, trace, warn};

const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie"];
const MAX_HEADER_VALUE_LEN: usize = 128;
const QUIET_PATHS: &[&str] = &["/health", "/ready", "/metrics"];

fn sanitize_headers(headers: &HeaderMap) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        let name_str = name.as_str();
        if REDACTED_HEADERS.contains(&name_str) {
            parts.push(format!("{name_str}=<redacted>"));
            continue;
        }
        let value_str = value.to_str().unwrap_or("<binary>");
        if value_str.len() > MAX_HEADER_VALUE_LEN {
            parts.push(format!("{name_str}={}...", &value_str[..MAX_HEADER_VALUE_LEN]));
        } else {
            parts.push(format!("{name_str}={value_str}"));
        }
    }
    parts.join(", ")
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let quiet = QUIET_PATHS.contains(&path.as_str());
    if quiet {
        trace!(target: "http", "request method={} path={}", method, path);
    } else {
        debug!(
            target: "http",
            "request method={} path={} headers=[{}]",
            method,
            path,
            sanitize_headers(req.headers())
        );
    }

    let started = Instant::now();
    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    if quiet {
        trace!(target: "http", "response method={} path={} status={} elapsed_ms={}", method, path, status.as_u16(), elapsed_ms);
    } else if status.is_server_error() {
        error!(target: "http", "response method={} path={} status={} elapsed_ms={}", method, path, status.as_u16(), elapsed_ms);
    } else if status.is_client_error() {
        warn!(target: "http", "response method={} path={} status={} elapsed_ms={}", method, path, status.as_u16(), elapsed_ms);
    } else {
        debug!(target: "http", "response method={} path={} status={} elapsed_ms={}", method, path, status.as_u16(), elapsed_ms);
    }
    response
}
