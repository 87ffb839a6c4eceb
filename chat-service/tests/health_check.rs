//! Probe and infrastructure endpoint tests.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use chat_service::config::{ChatConfig, ChatSettings, GoogleConfig, DEFAULT_GEMINI_API_BASE};
use chat_service::services::providers::mock::MockChatModel;
use chat_service::services::InMemoryHistoryStore;
use chat_service::startup::Application;
use common::TestApp;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_reports_model_state() {
    let ready = TestApp::with_model(MockChatModel::echo());
    let (status, body) = ready.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chat-service");
    assert_eq!(body["model"], "ready");

    let degraded = TestApp::without_model();
    let (status, body) = degraded.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "unavailable");
}

#[tokio::test]
async fn readiness_requires_model() {
    let (status, _) = TestApp::with_model(MockChatModel::echo())
        .get("/ready")
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = TestApp::without_model().get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::with_model(MockChatModel::echo());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let app = TestApp::with_model(MockChatModel::echo());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/chat")
                .header("origin", "http://localhost:19006")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:19006"
    );
}

#[tokio::test]
async fn application_serves_on_random_port() {
    let config = ChatConfig {
        common: service_core::config::Config {
            port: 0,
            ..Default::default()
        },
        google: GoogleConfig {
            api_key: None,
            model: "gemini-pro".to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        },
        chat: ChatSettings::default(),
        otlp_endpoint: None,
    };

    let app = Application::build_with(
        config,
        Some(Arc::new(MockChatModel::echo())),
        Arc::new(InMemoryHistoryStore::new()),
    )
    .await
    .expect("Failed to build application");
    let port = app.port();
    assert_ne!(port, 0);

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/chat", port))
        .json(&serde_json::json!({ "user_message": "ping", "session_id": "live" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["session_id"], "live");
    assert_eq!(body["ai_response"], MockChatModel::reply_for("ping"));
}
