//! Bearer token gate for mock mode.
//!
//! Requests must carry `Authorization: Bearer <auth.token>` unless they
//! target a system path. A bare `Authorization: <auth.token>` is accepted
//! too. Proxy mode is never gated here; the upstream does its own
//! authentication.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::ServerMode;
use crate::http::request::{strip_base_path, RequestIdExt};
use crate::http::response::json_error;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Paths reachable without a token.
pub fn is_exempt(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    matches!(path.as_str(), "/" | "/health" | "/api/version" | "/favicon.ico")
        || path.starts_with("/swagger")
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Invalid,
}

impl AuthFailure {
    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "Authorization header is required",
            AuthFailure::Invalid => "Invalid authentication token",
        }
    }
}

/// Check an `Authorization` header value against the expected token.
///
/// A leading `Bearer ` scheme is stripped; whatever remains must equal
/// `expected`.
pub fn check_bearer(header: Option<&str>, expected: &str) -> Result<(), AuthFailure> {
    let value = header.map(str::trim).filter(|v| !v.is_empty()).ok_or(AuthFailure::Missing)?;

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };

    if token == expected {
        Ok(())
    } else {
        Err(AuthFailure::Invalid)
    }
}

pub async fn bearer_auth(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let config = &state.config;
    if config.mode != ServerMode::Mock || !config.auth.enabled {
        return next.run(req).await;
    }

    let path = strip_base_path(req.uri().path(), config.base_path.as_deref());
    if is_exempt(path) {
        return next.run(req).await;
    }

    let header = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    match check_bearer(header, &config.auth.token) {
        Ok(()) => next.run(req).await,
        Err(failure) => reject(&req, failure, start),
    }
}

fn reject(req: &Request<Body>, failure: AuthFailure, start: Instant) -> Response {
    tracing::warn!(
        request_id = %req.request_id(),
        method = %req.method(),
        path = %req.uri().path(),
        reason = failure.message(),
        "Rejected unauthenticated request"
    );
    let response = json_error(StatusCode::UNAUTHORIZED, "Unauthorized", failure.message());
    metrics::record_request(
        req.method().as_str(),
        response.status().as_u16(),
        "unauthorized",
        start,
    );
    response
}
