//! Fallback handling for requests the mock engine does not answer.
//!
//! # Data Flow
//! ```text
//! request (no route / no representable response / proxy mode)
//!     → Fallback::Upstream → forwarder.rs (reqwest) → live service
//!     → Fallback::NotFound → 404 JSON
//! ```
//!
//! # Design Decisions
//! - The fallback is chosen once at startup from configuration
//! - Upstream failures become 502 with a JSON error body, never a panic

pub mod forwarder;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;

use crate::config::{MockConfig, ServerMode};
use crate::http::response::json_error;

pub use forwarder::{ProxyError, UpstreamForwarder};

/// Where requests go when no synthesized response applies.
#[derive(Debug, Clone)]
pub enum Fallback {
    Upstream(UpstreamForwarder),
    NotFound,
}

impl Fallback {
    /// Pick the fallback for a configuration.
    ///
    /// Proxy mode always forwards. Mock mode forwards only when an upstream
    /// is configured and `mock.fallback_to_upstream` is set.
    pub fn from_config(config: &MockConfig) -> Result<Self, ProxyError> {
        let wants_upstream = match config.mode {
            ServerMode::Proxy => true,
            ServerMode::Mock => {
                config.mock.fallback_to_upstream && config.upstream.base_url.is_some()
            }
        };

        if wants_upstream {
            let forwarder = UpstreamForwarder::new(&config.upstream, config.security.max_body_size)?;
            tracing::info!(upstream = %forwarder.base_url(), "Upstream fallback enabled");
            Ok(Fallback::Upstream(forwarder))
        } else {
            Ok(Fallback::NotFound)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Fallback::Upstream(_) => "upstream",
            Fallback::NotFound => "not_found",
        }
    }

    /// Serve `request`, whose base-path stripped path is `path`.
    pub async fn handle(&self, request: Request<Body>, path: &str) -> Response {
        match self {
            Fallback::Upstream(forwarder) => {
                let method = request.method().clone();
                match forwarder.forward(request, path).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!(method = %method, path = %path, error = %e, "Upstream request failed");
                        json_error(
                            StatusCode::BAD_GATEWAY,
                            "Failed to proxy request to upstream",
                            &e.to_string(),
                        )
                    }
                }
            }
            Fallback::NotFound => json_error(
                StatusCode::NOT_FOUND,
                "Not Found",
                &format!("No mock route for {} {}", request.method(), path),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_mode_without_upstream_is_not_found() {
        let config = MockConfig::default();
        assert!(matches!(Fallback::from_config(&config).unwrap(), Fallback::NotFound));
    }

    #[test]
    fn test_mock_mode_with_upstream_forwards() {
        let mut config = MockConfig::default();
        config.upstream.base_url = Some("http://127.0.0.1:3000".into());
        assert_eq!(Fallback::from_config(&config).unwrap().label(), "upstream");

        config.mock.fallback_to_upstream = false;
        assert_eq!(Fallback::from_config(&config).unwrap().label(), "not_found");
    }

    #[test]
    fn test_proxy_mode_requires_upstream() {
        let mut config = MockConfig::default();
        config.mode = ServerMode::Proxy;
        assert!(matches!(Fallback::from_config(&config), Err(ProxyError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let request = Request::get("/nope").body(Body::empty()).unwrap();
        let response = Fallback::NotFound.handle(request, "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "No mock route for GET /nope");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let mut config = MockConfig::default();
        // Port 9 (discard) is closed on test hosts.
        config.upstream.base_url = Some("http://127.0.0.1:9".into());
        config.upstream.timeout_secs = 2;
        let fallback = Fallback::from_config(&config).unwrap();

        let request = Request::get("/orders").body(Body::empty()).unwrap();
        let response = fallback.handle(request, "/orders").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
