//! `POST /chat`.

use crate::dtos::{ChatRequest, ChatResponse};
use crate::services::{metrics, ChatError};
use crate::startup::AppState;
use axum::{extract::State, Extension, Json};
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;
use uuid::Uuid;

/// Relay a user message to the model within its session.
///
/// A request without a usable `session_id` starts a new session; the generated
/// id is returned so the client can continue the conversation.
pub async fn chat(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = payload
        .requested_session_id()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| "-".to_string());

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        has_snapshot = payload.health_data_snapshot.is_some(),
        "Processing chat message"
    );

    let result = state
        .orchestrator
        .process_message(
            &session_id,
            &payload.user_message,
            payload.health_data_snapshot.as_ref(),
        )
        .await;

    match result {
        Ok(ai_response) => {
            metrics::record_chat_request("ok");
            if let Ok(count) = state.orchestrator.store().session_count().await {
                metrics::set_session_count(count);
            }
            Ok(Json(ChatResponse {
                ai_response,
                session_id,
            }))
        }
        Err(ChatError::ServiceUnavailable) => {
            metrics::record_chat_request("unavailable");
            tracing::warn!(
                request_id = %request_id,
                session_id = %session_id,
                "Chat rejected: model collaborator is not initialized"
            );
            Err(ChatError::ServiceUnavailable.into())
        }
        Err(e) => {
            metrics::record_chat_request("error");
            tracing::error!(
                request_id = %request_id,
                session_id = %session_id,
                error = %e,
                "Error processing chat"
            );
            Err(e.into())
        }
    }
}
