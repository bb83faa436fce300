use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::services::providers::{GenerationParams, InlineAudio};
use crate::startup::AppState;

/// Recordings are declared as mp3 no matter how the client encoded them.
const AUDIO_MIME_TYPE: &str = "audio/mp3";

const PRACTICE_TEXT_PROMPT: &str = r#"Generate a short English text (2-3 sentences) for pronunciation practice.
The text should:
- Include common English words that are often mispronounced
- Be interesting and meaningful
- Include a mix of different sounds and phonemes
- Be suitable for intermediate learners

Just give the text, no explanation or title."#;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePronunciationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "originalText and audioBase64 are required"))]
    pub original_text: String,

    /// Base64 audio payload, forwarded unchanged; no local decoding or
    /// format validation happens here.
    #[serde(default)]
    #[validate(length(min = 1, message = "originalText and audioBase64 are required"))]
    pub audio_base64: String,
}

/// Score a recording of the student reading `originalText` aloud.
#[tracing::instrument(skip(state, payload))]
pub async fn analyze_pronunciation(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePronunciationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let Json(request) = payload.map_err(|_| {
        AppError::Validation("originalText and audioBase64 are required".to_string())
    })?;
    request.validate()?;

    let prompt = build_analysis_prompt(&request.original_text);
    let audio = InlineAudio {
        mime_type: AUDIO_MIME_TYPE.to_string(),
        data: request.audio_base64,
    };

    let model = state.model.get().await?;
    let text = model
        .generate_with_audio(&prompt, &audio, &GenerationParams::default())
        .await?;

    Ok(Json(ApiResponse::success(text)))
}

/// Generate a short practice passage for the student to read aloud.
#[tracing::instrument(skip(state))]
pub async fn generate_practice_text(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let model = state.model.get().await?;
    let text = model
        .generate(PRACTICE_TEXT_PROMPT, &GenerationParams::default())
        .await?;

    Ok(Json(ApiResponse::success(text)))
}

fn build_analysis_prompt(original_text: &str) -> String {
    format!(
        "You are an English pronunciation teacher.\n\n\
         The student was supposed to read this text:\n\
         \"{original_text}\"\n\n\
         Please analyze their pronunciation and provide:\n\
         1. Overall pronunciation score (0-100)\n\
         2. Specific words that were mispronounced\n\
         3. Common pronunciation errors detected\n\
         4. Tips for improvement\n\
         5. Encouragement and positive feedback\n\n\
         Be constructive and encouraging in your feedback."
    )
}
