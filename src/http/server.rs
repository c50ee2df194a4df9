//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit, auth)
//! - Strip the base path
//! - Dispatch to the mock engine, then system endpoints, then the fallback
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{MockConfig, ServerMode};
use crate::http::middleware::bearer_auth;
use crate::http::request::{strip_base_path, RequestIdExt};
use crate::http::response::pretty_json;
use crate::http::system;
use crate::lifecycle::startup::LoadedSpec;
use crate::mock::{MockEngine, MockOutcome};
use crate::observability::metrics;
use crate::proxy::{Fallback, ProxyError};

const DEFAULT_SERVICE_NAME: &str = "API Double";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Absent when no specification could be loaded.
    pub engine: Option<Arc<MockEngine>>,
    /// The loaded document, serialized once for `/swagger/v1/swagger.json`.
    pub document: Option<Bytes>,
    pub fallback: Arc<Fallback>,
    pub config: Arc<MockConfig>,
    pub service_name: Arc<str>,
}

/// HTTP server for the API double.
pub struct HttpServer {
    router: Router,
    config: Arc<MockConfig>,
}

impl HttpServer {
    /// Create a server from a configuration and an optional specification.
    pub fn new(config: MockConfig, spec: Option<LoadedSpec>) -> Result<Self, ProxyError> {
        let fallback = Fallback::from_config(&config)?;

        let (engine, document, title) = match spec {
            Some(loaded) => {
                let document = match serde_json::to_vec_pretty(&loaded.document) {
                    Ok(bytes) => Some(Bytes::from(bytes)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to serialize OpenAPI document");
                        None
                    }
                };
                let title = loaded.specification.title.clone();
                let engine = MockEngine::new(Arc::new(loaded.specification));
                (Some(Arc::new(engine)), document, Some(title))
            }
            None => (None, None, None),
        };

        let service_name = if config.service.name.is_empty() {
            title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string())
        } else {
            config.service.name.clone()
        };

        if config.mode == ServerMode::Mock && config.auth.enabled {
            tracing::info!(token = %config.auth.token, "Mock mode bearer token");
        }

        let config = Arc::new(config);
        let state = AppState {
            engine,
            document,
            fallback: Arc::new(fallback),
            config: config.clone(),
            service_name: service_name.into(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MockConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .layer(middleware::from_fn_with_state(state.clone(), bearer_auth))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = self.config.mode.label(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }
}

/// Catch-all handler: engine, then system endpoints, then fallback.
///
/// Operations the document declares win over the built-in system paths.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let request_id = request.request_id().to_string();
    let path = strip_base_path(request.uri().path(), state.config.base_path.as_deref()).to_string();

    let engine = match (&state.engine, state.config.mode) {
        (Some(engine), ServerMode::Mock) => Some(engine),
        _ => None,
    };

    if let Some(engine) = engine {
        match engine.respond(method.as_str(), &path) {
            MockOutcome::Synthesized {
                template,
                content_type,
                body,
            } => {
                tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    template = %template,
                    media_type = %content_type,
                    "Served synthesized response"
                );
                let response = pretty_json(StatusCode::OK, &body);
                metrics::record_request(method.as_str(), response.status().as_u16(), "mock", start);
                return response;
            }
            outcome => {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    outcome = outcome.label(),
                    fallback = state.fallback.label(),
                    "Engine declined request"
                );
            }
        }
    }

    if let Some(response) = system::respond(&state, &method, &path) {
        metrics::record_request(method.as_str(), response.status().as_u16(), "system", start);
        return response;
    }

    let response = state.fallback.handle(request, &path).await;
    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        state.fallback.label(),
        start,
    );
    response
}
