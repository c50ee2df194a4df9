//! Request inspection helpers.
//!
//! # Responsibilities
//! - Expose the correlation ID set by the request-id layer
//! - Strip the configured base path before routing
//!
//! # Design Decisions
//! - Request IDs are UUID v4, generated by `tower_http` as early as possible
//! - Base path matching is case-insensitive and stops at segment boundaries

use axum::http::Request;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Read the correlation ID attached to a request.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Remove `base` from the front of `path`.
///
/// `/CRMApi/v1/x` with base `/crmapi` becomes `/v1/x`; `/CRMApi` becomes `/`.
/// Paths outside the base are returned unchanged.
pub fn strip_base_path<'a>(path: &'a str, base: Option<&str>) -> &'a str {
    let base = match base.map(|b| b.trim_end_matches('/')) {
        Some(b) if !b.is_empty() => b,
        _ => return path,
    };

    let Some(head) = path.get(..base.len()) else {
        return path;
    };
    if !head.eq_ignore_ascii_case(base) {
        return path;
    }

    match &path[base.len()..] {
        "" => "/",
        rest if rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_strip_base_path() {
        let base = Some("/CRMApi");
        assert_eq!(strip_base_path("/CRMApi/v1/ClientData", base), "/v1/ClientData");
        assert_eq!(strip_base_path("/crmapi/v1/ClientData", base), "/v1/ClientData");
        assert_eq!(strip_base_path("/CRMApi", base), "/");
        assert_eq!(strip_base_path("/CRMApi/", base), "/");
        assert_eq!(strip_base_path("/CRMApiX/v1", base), "/CRMApiX/v1");
        assert_eq!(strip_base_path("/v1/ClientData", base), "/v1/ClientData");
        assert_eq!(strip_base_path("/", base), "/");
    }

    #[test]
    fn test_strip_without_base() {
        assert_eq!(strip_base_path("/v1/x", None), "/v1/x");
        assert_eq!(strip_base_path("/v1/x", Some("/")), "/v1/x");
        assert_eq!(strip_base_path("/api/v1", Some("/api/")), "/v1");
    }

    #[test]
    fn test_request_id() {
        let request = Request::get("/")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request.request_id(), "abc-123");

        let request = Request::get("/").body(Body::empty()).unwrap();
        assert_eq!(request.request_id(), "unknown");
    }
}
