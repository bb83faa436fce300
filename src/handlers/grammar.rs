use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::services::providers::GenerationParams;
use crate::startup::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrammarRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "userMessage is required"))]
    pub user_message: String,

    pub context: Option<String>,
}

/// Ask the model to review a student message as a grammar teacher.
///
/// The response is free-form formatted text, not a structured payload.
#[tracing::instrument(skip(state, payload))]
pub async fn analyze_grammar(
    State(state): State<AppState>,
    payload: Result<Json<GrammarRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let Json(request) =
        payload.map_err(|_| AppError::Validation("userMessage is required".to_string()))?;
    request.validate()?;

    let prompt = build_grammar_prompt(&request.user_message, request.context.as_deref());

    let model = state.model.get().await?;
    let text = model.generate(&prompt, &GenerationParams::default()).await?;

    Ok(Json(ApiResponse::success(text)))
}

fn build_grammar_prompt(user_message: &str, context: Option<&str>) -> String {
    let context_block = context
        .filter(|c| !c.is_empty())
        .map(|c| format!("Context: {}\n\n", c))
        .unwrap_or_default();

    format!(
        "You are an English grammar teacher.\n\n\
         {context_block}Student's message: \"{user_message}\"\n\n\
         Please analyze the grammar and provide:\n\
         1. Grammar score (0-100)\n\
         2. Grammatical errors (if any) with corrections\n\
         3. Suggestions for better sentence structure\n\
         4. Vocabulary usage feedback\n\
         5. Brief encouragement\n\n\
         Format your response clearly with sections."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_quotes_the_student_message() {
        let prompt = build_grammar_prompt("I has a cat", None);

        assert!(prompt.contains("Student's message: \"I has a cat\""));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn prompt_prefixes_context_when_present() {
        let prompt = build_grammar_prompt("I has a cat", Some("Talking about pets"));

        assert!(prompt.contains("Context: Talking about pets\n\nStudent's message:"));
    }

    #[test]
    fn empty_context_is_omitted() {
        let prompt = build_grammar_prompt("I has a cat", Some(""));

        assert!(!prompt.contains("Context:"));
    }
}
