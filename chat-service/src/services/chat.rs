//! Chat orchestration: compose the message, consult history, call the model,
//! record the exchange.

use crate::models::{compose_message, HealthSnapshot, Turn};
use crate::services::history::HistoryStore;
use crate::services::metrics;
use crate::services::providers::ChatModel;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Detail returned when no model collaborator could be initialized.
pub const SERVICE_UNAVAILABLE_DETAIL: &str =
    "AI service is not initialized. Check API key and logs.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("model collaborator is not initialized")]
    ServiceUnavailable,

    #[error("chat processing failed: {0:#}")]
    InternalProcessing(#[from] anyhow::Error),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::ServiceUnavailable => {
                AppError::ServiceUnavailable(SERVICE_UNAVAILABLE_DETAIL.to_string())
            }
            ChatError::InternalProcessing(e) => AppError::InternalError(e),
        }
    }
}

/// Runs one chat exchange per call against a shared history store.
pub struct ChatOrchestrator {
    model: Option<Arc<dyn ChatModel>>,
    store: Arc<dyn HistoryStore>,
    model_timeout: Duration,
    max_history_turns: usize,
}

impl ChatOrchestrator {
    /// `model` is `None` when the collaborator failed to initialize; every
    /// exchange then fails with [`ChatError::ServiceUnavailable`].
    pub fn new(
        model: Option<Arc<dyn ChatModel>>,
        store: Arc<dyn HistoryStore>,
        model_timeout: Duration,
        max_history_turns: usize,
    ) -> Self {
        Self {
            model,
            store,
            model_timeout,
            max_history_turns,
        }
    }

    pub fn is_model_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Process one user message and return the model's reply.
    ///
    /// History is only updated when the model call succeeds.
    #[tracing::instrument(
        skip(self, user_message, snapshot),
        fields(message_len = user_message.len(), history_len = tracing::field::Empty)
    )]
    pub async fn process_message(
        &self,
        session_id: &str,
        user_message: &str,
        snapshot: Option<&HealthSnapshot>,
    ) -> Result<String, ChatError> {
        let model = self.model.as_ref().ok_or(ChatError::ServiceUnavailable)?;

        let message = compose_message(user_message, snapshot);
        let history = self.store.get_or_create(session_id).await?;
        let context = self.context_window(&history);
        tracing::Span::current().record("history_len", history.len());

        let start = Instant::now();
        let result = tokio::time::timeout(self.model_timeout, model.send_message(context, &message))
            .await;
        metrics::record_model_latency(model.model_name(), start.elapsed().as_secs_f64());

        let reply = match result {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                metrics::record_model_error(e.kind());
                return Err(ChatError::InternalProcessing(
                    anyhow::Error::new(e).context("model call failed"),
                ));
            }
            Err(_) => {
                metrics::record_model_error("timeout");
                return Err(ChatError::InternalProcessing(anyhow::anyhow!(
                    "model call timed out after {:?}",
                    self.model_timeout
                )));
            }
        };

        metrics::record_tokens(model.model_name(), reply.input_tokens, reply.output_tokens);

        self.store
            .append(session_id, message, reply.text.clone())
            .await?;

        tracing::info!(
            model = %model.model_name(),
            sent_turns = context.len(),
            reply_len = reply.text.len(),
            "Chat exchange completed"
        );

        Ok(reply.text)
    }

    /// The slice of history sent to the model.
    ///
    /// With a positive `max_history_turns`, keeps the most recent turns rounded
    /// down to whole user/model pairs so the window opens on a user turn.
    fn context_window<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        if self.max_history_turns == 0 || history.len() <= self.max_history_turns {
            return history;
        }
        let keep = self.max_history_turns - self.max_history_turns % 2;
        &history[history.len() - keep..]
    }
}
