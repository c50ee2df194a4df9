//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build the upstream URL (base URL + stripped path + query)
//! - Copy request headers, minus Host, Authorization and hop-by-hop headers
//! - Inject the upstream bearer token
//! - Forward bodies for POST, PUT and PATCH
//! - Copy the upstream status, headers and body back
//!
//! # Design Decisions
//! - Upstream failures surface as `ProxyError`; the caller maps them to 502
//! - Bodies are buffered up to the configured limit

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no upstream configured")]
    NotConfigured,

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid upstream bearer token")]
    InvalidToken,

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Reverse proxy to a single upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: Url,
    bearer: Option<HeaderValue>,
    max_body_size: usize,
}

impl UpstreamForwarder {
    /// Create a forwarder from configuration.
    pub fn new(config: &UpstreamConfig, max_body_size: usize) -> Result<Self, ProxyError> {
        let raw = config.base_url.as_deref().ok_or(ProxyError::NotConfigured)?;
        let base_url = Url::parse(raw)?;

        let bearer = match config.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => Some(
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ProxyError::InvalidToken)?,
            ),
            None => {
                tracing::warn!(
                    upstream = %base_url,
                    "No upstream bearer token configured (set UPSTREAM_BEARER_TOKEN or upstream.bearer_token); requests may be rejected upstream"
                );
                None
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProxyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            bearer,
            max_body_size,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upstream URL for a (base-path stripped) request path and query.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
        let mut target = String::with_capacity(self.base_url.as_str().len() + path.len());
        target.push_str(self.base_url.as_str().trim_end_matches('/'));
        if !path.starts_with('/') {
            target.push('/');
        }
        target.push_str(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Ok(Url::parse(&target)?)
    }

    /// Forward `request` as `path` and relay the upstream response.
    pub async fn forward(&self, request: Request<Body>, path: &str) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();
        let url = self.target_url(path, parts.uri.query())?;

        tracing::info!(method = %parts.method, target = %url, "Proxying request");

        let headers = self.upstream_headers(&parts.headers);
        let mut upstream = self.client.request(parts.method.clone(), url.clone()).headers(headers);

        if carries_body(&parts.method) {
            let bytes = axum::body::to_bytes(body, self.max_body_size)
                .await
                .map_err(|e| ProxyError::Body(e.to_string()))?;
            upstream = upstream.body(bytes);
        }

        let upstream = upstream.send().await?;
        let status = upstream.status();

        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in upstream.headers() {
                if !is_hop_by_hop(name) && name != header::CONTENT_LENGTH {
                    headers.append(name.clone(), value.clone());
                }
            }
        }
        let bytes = upstream.bytes().await?;
        let response = builder.body(Body::from(bytes))?;

        tracing::info!(
            status = status.as_u16(),
            method = %parts.method,
            target = %url,
            "Proxy response"
        );
        Ok(response)
    }

    fn upstream_headers(&self, incoming: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(incoming.len() + 1);
        for (name, value) in incoming {
            if name == header::HOST
                || name == header::AUTHORIZATION
                || name == header::CONTENT_LENGTH
                || is_hop_by_hop(name)
            {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        if let Some(bearer) = &self.bearer {
            headers.insert(header::AUTHORIZATION, bearer.clone());
        }
        headers
    }
}

fn carries_body(method: &Method) -> bool {
    method == Method::POST || method == Method::PUT || method == Method::PATCH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarder(base: &str, token: Option<&str>) -> UpstreamForwarder {
        let config = UpstreamConfig {
            base_url: Some(base.to_string()),
            bearer_token: token.map(str::to_string),
            timeout_secs: 5,
        };
        UpstreamForwarder::new(&config, 1024).unwrap()
    }

    #[test]
    fn test_target_url_joins_base_path_and_query() {
        let fwd = forwarder("https://crm.example.com/api/", None);
        assert_eq!(
            fwd.target_url("/v1/ClientData/42", Some("expand=true")).unwrap().as_str(),
            "https://crm.example.com/api/v1/ClientData/42?expand=true"
        );
        assert_eq!(
            fwd.target_url("/", None).unwrap().as_str(),
            "https://crm.example.com/api/"
        );
    }

    #[test]
    fn test_target_url_without_base_path() {
        let fwd = forwarder("http://127.0.0.1:3000", None);
        assert_eq!(
            fwd.target_url("/health", Some("")).unwrap().as_str(),
            "http://127.0.0.1:3000/health"
        );
    }

    #[test]
    fn test_headers_are_filtered_and_token_injected() {
        let fwd = forwarder("http://127.0.0.1:3000", Some("upstream-secret"));
        let mut incoming = HeaderMap::new();
        incoming.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        incoming.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 123"));
        incoming.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        incoming.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        incoming.insert("x-request-id", HeaderValue::from_static("abc"));

        let headers = fwd.upstream_headers(&incoming);
        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(headers[header::AUTHORIZATION], "Bearer upstream-secret");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(headers["x-request-id"], "abc");
    }

    #[test]
    fn test_client_authorization_is_dropped_without_token() {
        let fwd = forwarder("http://127.0.0.1:3000", None);
        let mut incoming = HeaderMap::new();
        incoming.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 123"));
        assert!(fwd.upstream_headers(&incoming).get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_requires_base_url() {
        let err = UpstreamForwarder::new(&UpstreamConfig::default(), 1024).unwrap_err();
        assert!(matches!(err, ProxyError::NotConfigured));
    }

    #[test]
    fn test_body_methods() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
    }
}
