//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use api_double::config::MockConfig;
use api_double::lifecycle::{LoadedSpec, Shutdown};
use api_double::spec::build_specification;
use api_double::spec::loader::{parse_document, DocumentFormat};
use api_double::HttpServer;

pub const CRM_SPEC: &str = r##"{
    "openapi": "3.0.1",
    "info": {"title": "CRM API", "version": "v1"},
    "paths": {
        "/v1/ClientData/{clientId}": {
            "get": {
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/Client"}}
                        }
                    }
                }
            }
        },
        "/v1/Orders": {
            "get": {
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {
                            "application/json": {
                                "schema": {"type": "array", "items": {"$ref": "#/components/schemas/Order"}}
                            }
                        }
                    }
                }
            },
            "post": {
                "responses": {"201": {"description": "Created"}}
            }
        }
    },
    "components": {
        "schemas": {
            "Client": {
                "type": "object",
                "properties": {
                    "clientId": {"type": "integer", "format": "int32"},
                    "firstName": {"type": "string"},
                    "email": {"type": "string"},
                    "createdAt": {"type": "string", "format": "date-time"},
                    "orders": {"type": "array", "items": {"$ref": "#/components/schemas/Order"}}
                }
            },
            "Order": {
                "type": "object",
                "properties": {
                    "orderId": {"type": "string", "format": "uuid"},
                    "total": {"type": "number", "format": "double"},
                    "client": {"$ref": "#/components/schemas/Client"}
                }
            }
        }
    }
}"##;

/// Parse the CRM fixture document.
#[allow(dead_code)]
pub fn crm_spec() -> LoadedSpec {
    spec_from_json(CRM_SPEC)
}

/// Parse an inline JSON document.
#[allow(dead_code)]
pub fn spec_from_json(text: &str) -> LoadedSpec {
    let document = parse_document(text, DocumentFormat::Json).unwrap();
    let specification = build_specification(&document);
    LoadedSpec {
        document,
        specification,
    }
}

/// Mock-mode config with no upstream and metrics off.
#[allow(dead_code)]
pub fn mock_config() -> MockConfig {
    let mut config = MockConfig::default();
    config.observability.metrics_enabled = false;
    config
}

/// Start the API double on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: MockConfig, spec: Option<LoadedSpec>) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config, spec).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Start an upstream that echoes what it received as JSON.
#[allow(dead_code)]
pub async fn start_echo_upstream() -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        Json(json!({
            "upstream": true,
            "method": method.as_str(),
            "path": uri.path(),
            "query": uri.query(),
            "authorization": header(header::AUTHORIZATION.as_str()),
            "request_id": header("x-request-id"),
            "body": String::from_utf8_lossy(&body),
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, Router::new().fallback(echo)).await;
    });
    addr
}

/// HTTP client that never goes through a system proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
