//! Application startup and lifecycle management.

use crate::config::ChatConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiChatProvider, GeminiConfig};
use crate::services::providers::ChatModel;
use crate::services::{ChatOrchestrator, HistoryStore, InMemoryHistoryStore};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Build the model collaborator, or `None` if it cannot be initialized.
///
/// Initialization failure is not fatal: the service starts and answers 503.
pub fn build_model(config: &ChatConfig) -> Option<Arc<dyn ChatModel>> {
    let gemini_config = GeminiConfig {
        api_key: config.google.api_key.clone(),
        model: config.google.model.clone(),
        api_base: config.google.api_base.clone(),
        request_timeout: config.chat.model_timeout(),
    };

    match GeminiChatProvider::new(gemini_config) {
        Ok(provider) => {
            tracing::info!(model = %config.google.model, "Initialized Gemini chat provider");
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::error!(
                model = %config.google.model,
                error = %e,
                "Error initializing Gemini model; chat requests will return 503"
            );
            None
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        // Development-grade CORS: any origin, method and header.
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let model = build_model(&config);
        let store: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
        Self::build_with(config, model, store).await
    }

    /// Build with explicit collaborators; port 0 binds a random port.
    pub async fn build_with(
        config: ChatConfig,
        model: Option<Arc<dyn ChatModel>>,
        store: Arc<dyn HistoryStore>,
    ) -> Result<Self, AppError> {
        let orchestrator = Arc::new(ChatOrchestrator::new(
            model,
            store,
            config.chat.model_timeout(),
            config.chat.max_history_turns,
        ));
        let router = build_router(AppState::new(orchestrator));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chat service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until the process receives Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
