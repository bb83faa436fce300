use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::services::providers::GenerationParams;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateTextRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Prompt is required and must be a string"))]
    pub prompt: String,
}

/// Forward a free-text prompt verbatim: no history, no system instruction.
#[tracing::instrument(skip(state, payload))]
pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let Json(request) = payload.map_err(|_| {
        AppError::Validation("Prompt is required and must be a string".to_string())
    })?;
    request.validate()?;

    let model = state.model.get().await?;
    let text = model
        .generate(&request.prompt, &GenerationParams::default())
        .await?;

    Ok(Json(ApiResponse::success(text)))
}
