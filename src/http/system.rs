//! System endpoints served in every mode.
//!
//! - `GET /`: welcome text
//! - `GET /health`: liveness document
//! - `GET /api/version`: service identity
//! - `GET /swagger/v1/swagger.json`: the loaded OpenAPI document

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::response::{json_error, timestamp};
use crate::http::server::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Answer `path` if it names a system endpoint.
pub fn respond(state: &AppState, method: &Method, path: &str) -> Option<Response> {
    if method != Method::GET {
        return None;
    }

    let mode = state.config.mode.label();
    let path = path.trim_end_matches('/');
    let response = match path.to_ascii_lowercase().as_str() {
        "" => {
            let text = match &state.engine {
                Some(engine) => format!(
                    "{} is running in {mode} mode. {} operations loaded. See /swagger/v1/swagger.json for the API document.",
                    state.service_name,
                    engine.specification().operation_count(),
                ),
                None => format!(
                    "{} is running in {mode} mode without a specification.",
                    state.service_name
                ),
            };
            text.into_response()
        }
        "/health" => Json(json!({
            "status": "Healthy",
            "timestamp": timestamp(),
            "version": VERSION,
            "mode": mode,
        }))
        .into_response(),
        "/api/version" => Json(json!({
            "version": VERSION,
            "name": state.service_name.as_ref(),
            "status": "Running",
            "environment": state.config.service.environment,
            "mode": mode,
        }))
        .into_response(),
        "/swagger/v1/swagger.json" => match &state.document {
            Some(document) => (
                [(header::CONTENT_TYPE, "application/json")],
                document.clone(),
            )
                .into_response(),
            None => json_error(StatusCode::NOT_FOUND, "Not Found", "No specification loaded"),
        },
        _ => return None,
    };
    Some(response)
}
