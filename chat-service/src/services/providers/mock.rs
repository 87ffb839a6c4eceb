//! Mock chat model for testing.

use super::{ChatModel, ModelReply, ProviderError};
use crate::models::Turn;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// How the mock answers.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with `"Mock reply to: {message}"`.
    Echo,
    /// Fail every call with an API error.
    Fail,
    /// Echo after sleeping for the given duration.
    Delay(Duration),
}

/// One recorded `send_message` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub history: Vec<Turn>,
    pub message: String,
}

/// Mock chat model that records every call it receives.
pub struct MockChatModel {
    behavior: MockBehavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockChatModel {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Fail)
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn reply_for(message: &str) -> String {
        format!("Mock reply to: {}", message)
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn send_message(
        &self,
        history: &[Turn],
        message: &str,
    ) -> Result<ModelReply, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                history: history.to_vec(),
                message: message.to_string(),
            });
        }

        match &self.behavior {
            MockBehavior::Echo => {}
            MockBehavior::Fail => {
                return Err(ProviderError::ApiError(
                    "mock provider failure: quota exhausted".to_string(),
                ));
            }
            MockBehavior::Delay(delay) => tokio::time::sleep(*delay).await,
        }

        Ok(ModelReply {
            text: Self::reply_for(message),
            input_tokens: message.len() as u64 / 4,
            output_tokens: 10,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
