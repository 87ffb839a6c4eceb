//! Request and response bodies for the HTTP API.

use crate::models::HealthSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    pub user_message: String,
    /// Conversation key. Omitted or blank means "start a new session".
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub health_data_snapshot: Option<HealthSnapshot>,
}

impl ChatRequest {
    /// The caller's session id, if it supplied a usable one.
    pub fn requested_session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub ai_response: String,
    pub session_id: String,
}
