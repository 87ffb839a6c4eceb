//! Model collaborator abstraction and implementations.
//!
//! The orchestrator only sees [`ChatModel`]; Gemini is the production backend
//! and the mock backs the tests.

pub mod gemini;
pub mod mock;

use crate::models::Turn;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// A generated reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub text: String,

    /// Prompt tokens consumed, as reported by the provider.
    pub input_tokens: u64,

    /// Tokens generated.
    pub output_tokens: u64,
}

/// A conversational model: given prior turns and a new user message, produce a reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn send_message(
        &self,
        history: &[Turn],
        message: &str,
    ) -> Result<ModelReply, ProviderError>;

    /// Model identifier used in logs and metric labels.
    fn model_name(&self) -> &str;
}
