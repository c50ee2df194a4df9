//! End-to-end tests for the API double over real sockets.

use axum::http::StatusCode;
use serde_json::Value;

use api_double::config::ServerMode;

mod common;

#[tokio::test]
async fn test_mock_mode_serves_synthesized_json() {
    let mut config = common::mock_config();
    config.base_path = Some("/CRMApi".into());
    let (addr, shutdown) = common::start_server(config, Some(common::crm_spec())).await;

    let res = common::client()
        .get(format!("http://{addr}/CRMApi/v1/ClientData/42"))
        .bearer_auth("123")
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));

    let text = res.text().await.unwrap();
    assert!(text.contains("\n  \""), "body should be indented: {text}");

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["clientId"], 42);
    assert_eq!(body["firstName"], "John");
    assert_eq!(body["email"], "john.doe@example.com");
    assert!(body["createdAt"].as_str().unwrap().ends_with('Z'));

    let orders = body["orders"].as_array().unwrap();
    assert!((1..=3).contains(&orders.len()));
    for order in orders {
        assert_eq!(order["orderId"].as_str().unwrap().len(), 36);
        assert!(order["client"].is_null());
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_mock_mode_requires_bearer_token() {
    let (addr, shutdown) = common::start_server(common::mock_config(), Some(common::crm_spec())).await;
    let client = common::client();
    let url = format!("http://{addr}/v1/Orders");

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "Authorization header is required");

    let res = client.get(&url).bearer_auth("wrong").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid authentication token");

    let res = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "Healthy");
    assert_eq!(body["mode"], "Mock");

    shutdown.trigger();
}

#[tokio::test]
async fn test_undeclared_route_without_upstream_is_not_found() {
    let (addr, shutdown) = common::start_server(common::mock_config(), Some(common::crm_spec())).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/v1/Invoices"))
        .bearer_auth("123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not Found");

    // Declared method without a 200 response also falls through.
    let res = client
        .post(format!("http://{addr}/v1/Orders"))
        .bearer_auth("123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unanswered_requests_fall_back_to_upstream() {
    let upstream = common::start_echo_upstream().await;
    let mut config = common::mock_config();
    config.base_path = Some("/CRMApi".into());
    config.upstream.base_url = Some(format!("http://{upstream}"));
    config.upstream.bearer_token = Some("upstream-secret".into());
    let (addr, shutdown) = common::start_server(config, Some(common::crm_spec())).await;

    let res = common::client()
        .post(format!("http://{addr}/CRMApi/v1/Orders?source=test"))
        .bearer_auth("123")
        .header("x-request-id", "req-1")
        .body(r#"{"total": 12.5}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["upstream"], true);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/v1/Orders");
    assert_eq!(body["query"], "source=test");
    assert_eq!(body["authorization"], "Bearer upstream-secret");
    assert_eq!(body["request_id"], "req-1");
    assert_eq!(body["body"], r#"{"total": 12.5}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_proxy_mode_forwards_all_but_system_endpoints() {
    let upstream = common::start_echo_upstream().await;
    let mut config = common::mock_config();
    config.mode = ServerMode::Proxy;
    config.upstream.base_url = Some(format!("http://{upstream}"));
    let (addr, shutdown) = common::start_server(config, Some(common::crm_spec())).await;
    let client = common::client();

    // Declared route, no token: proxy mode neither gates nor synthesizes.
    let res = client
        .get(format!("http://{addr}/v1/ClientData/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["upstream"], true);
    assert_eq!(body["path"], "/v1/ClientData/42");
    assert!(body["authorization"].is_null());

    let res = client.get(format!("http://{addr}/api/version")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "CRM API");
    assert_eq!(body["status"], "Running");
    assert_eq!(body["mode"], "Proxy");
    assert_eq!(body["environment"], "Development");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Reserve a port, then free it so nothing is listening.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let mut config = common::mock_config();
    config.mode = ServerMode::Proxy;
    config.upstream.base_url = Some(format!("http://{dead}"));
    config.upstream.timeout_secs = 2;
    let (addr, shutdown) = common::start_server(config, None).await;

    let res = common::client().get(format!("http://{addr}/v1/anything")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to proxy request to upstream");
    assert!(body["timestamp"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_swagger_document() {
    let (addr, shutdown) = common::start_server(common::mock_config(), Some(common::crm_spec())).await;
    let res = common::client()
        .get(format!("http://{addr}/swagger/v1/swagger.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["info"]["title"], "CRM API");
    assert!(body["paths"]["/v1/Orders"]["get"].is_object());
    shutdown.trigger();

    let (addr, shutdown) = common::start_server(common::mock_config(), None).await;
    let client = common::client();
    let res = client
        .get(format!("http://{addr}/swagger/v1/swagger.json"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("without a specification"));
    shutdown.trigger();
}
