use axum::{extract::State, Json};

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::services::providers::GenerationParams;
use crate::startup::AppState;

const DEBATE_TOPIC_PROMPT: &str = r#"Generate one random interesting debate topic for English learners.
The topic should be:
- Suitable for intermediate to advanced English learners
- Engaging and thought-provoking
- Not too controversial or sensitive
- Can be discussed in 5-10 minutes

Just give the topic, no explanation. Format: "Topic: [your topic here]""#;

/// Ask the model for one random debate topic, formatted as `Topic: ...`.
#[tracing::instrument(skip(state))]
pub async fn debate_topic(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let model = state.model.get().await?;
    let text = model
        .generate(DEBATE_TOPIC_PROMPT, &GenerationParams::default())
        .await?;

    Ok(Json(ApiResponse::success(text)))
}
