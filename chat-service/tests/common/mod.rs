#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chat_service::services::providers::mock::MockChatModel;
use chat_service::services::providers::ChatModel;
use chat_service::services::{ChatOrchestrator, InMemoryHistoryStore};
use chat_service::startup::build_router;
use chat_service::AppState;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

/// Router wired to a mock model (or none) and an inspectable store.
pub struct TestApp {
    pub router: Router,
    pub model: Option<Arc<MockChatModel>>,
    pub store: Arc<InMemoryHistoryStore>,
}

impl TestApp {
    pub fn with_model(model: MockChatModel) -> Self {
        Self::build(Some(Arc::new(model)))
    }

    pub fn without_model() -> Self {
        Self::build(None)
    }

    fn build(model: Option<Arc<MockChatModel>>) -> Self {
        let store = Arc::new(InMemoryHistoryStore::new());
        let orchestrator = ChatOrchestrator::new(
            model.clone().map(|m| m as Arc<dyn ChatModel>),
            store.clone(),
            Duration::from_secs(5),
            0,
        );
        let router = build_router(AppState::new(Arc::new(orchestrator)));

        Self {
            router,
            model,
            store,
        }
    }

    pub fn model(&self) -> &MockChatModel {
        self.model.as_deref().expect("test app has no model")
    }

    pub async fn post_chat(&self, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
