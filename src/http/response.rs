//! Response construction.
//!
//! # Responsibilities
//! - Render synthesized bodies as indented JSON
//! - Build the JSON error envelope `{error, message, timestamp}`

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// Current time as RFC 3339 UTC.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// JSON error body with a timestamp.
pub fn json_error(status: StatusCode, error: &str, message: &str) -> Response {
    let body = json!({
        "error": error,
        "message": message,
        "timestamp": timestamp(),
    });
    (status, axum::Json(body)).into_response()
}

/// Indented `application/json` body. A `null` document is written as `{}`.
pub fn pretty_json(status: StatusCode, body: &Value) -> Response {
    let text = if body.is_null() {
        "{}".to_string()
    } else {
        match serde_json::to_string_pretty(body) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                return json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Failed to serialize response body",
                );
            }
        }
    };

    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_pretty_json_is_indented() {
        let response = pretty_json(StatusCode::OK, &json!({"a": 1}));
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_null_body_is_empty_object() {
        let response = pretty_json(StatusCode::OK, &Value::Null);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, "{}");
    }

    #[tokio::test]
    async fn test_json_error_shape() {
        let response = json_error(StatusCode::UNAUTHORIZED, "Unauthorized", "nope");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "nope");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
