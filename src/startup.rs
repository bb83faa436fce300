//! Application startup and lifecycle management.

use crate::config::{ProviderKind, TutorConfig};
use crate::error::AppError;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiModel};
use crate::services::providers::mock::MockModel;
use crate::services::providers::GenerativeModel;
use crate::services::ModelAccessor;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TutorConfig,
    pub model: Arc<ModelAccessor>,
}

/// Build the router with all endpoint routes and middleware layers.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/chat", post(handlers::chat))
        .route("/debate-topic", get(handlers::debate_topic))
        .route("/generate-text", post(handlers::generate_text))
        .route("/grammar", post(handlers::analyze_grammar))
        .route("/pronunciation/analyze", post(handlers::analyze_pronunciation))
        .route("/pronunciation/generate", get(handlers::generate_practice_text))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the model accessor for the configured backend.
///
/// The Gemini factory defers the credential check to first use, so a missing
/// key fails the request that needs the model, not process start.
fn build_model_accessor(config: &TutorConfig) -> Arc<ModelAccessor> {
    match config.models.provider {
        ProviderKind::Mock => {
            tracing::info!("Using mock generative model");
            Arc::new(ModelAccessor::with_provider(Arc::new(MockModel::new(true))))
        }
        ProviderKind::Gemini => {
            let api_key = config.google.api_key.clone();
            let model_name = config.models.text_model.clone();

            Arc::new(ModelAccessor::new(move || {
                let api_key = api_key.clone().ok_or_else(|| {
                    AppError::Configuration(anyhow::anyhow!(
                        "GEMINI_API_KEY environment variable is not set"
                    ))
                })?;

                tracing::info!(model = %model_name, "Initializing Gemini model");

                Ok(Arc::new(GeminiModel::new(GeminiConfig {
                    api_key,
                    model: model_name.clone(),
                })) as Arc<dyn GenerativeModel>)
            }))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: TutorConfig) -> Result<Self, AppError> {
        let model = build_model_accessor(&config);
        let state = AppState { config, model };

        // Port 0 = random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("english-tutor-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = app_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
