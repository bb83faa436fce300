//! Shared test helpers.

use english_tutor_service::config::{
    CommonConfig, GoogleConfig, ModelConfig, ProviderKind, TutorConfig,
};
use english_tutor_service::services::providers::mock::MockModel;
use english_tutor_service::services::ModelAccessor;
use english_tutor_service::startup::{app_router, AppState, Application};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

/// Config pointing at the mock backend on a random port.
pub fn test_config() -> TutorConfig {
    TutorConfig {
        common: CommonConfig { port: 0 },
        models: ModelConfig {
            text_model: "gemini-2.0-flash".to_string(),
            provider: ProviderKind::Mock,
        },
        google: GoogleConfig { api_key: None },
    }
}

/// Build a router around an injected mock so tests can inspect calls.
#[allow(dead_code)]
pub fn test_app(model: Arc<MockModel>) -> Router {
    let state = AppState {
        config: test_config(),
        model: Arc::new(ModelAccessor::with_provider(model)),
    };

    app_router(state)
}

/// Spawn the full application on a random port and return the port number.
#[allow(dead_code)]
pub async fn spawn_app() -> u16 {
    let app = Application::build(test_config())
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}
