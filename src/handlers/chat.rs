use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::services::providers::{ChatRequest, ChatTurn, GenerationParams, Role};
use crate::startup::AppState;

/// Persona used when the caller does not supply one.
const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful English learning assistant.";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    /// Kept as raw JSON so a non-array value can be rejected with the
    /// documented message instead of a deserialization error.
    #[serde(default)]
    pub history: Option<serde_json::Value>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    pub system_instruction: Option<String>,
}

/// One incoming history entry, as clients send it.
///
/// `content` takes precedence over `text`; any role other than exactly
/// "user" maps to the model side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub role: Option<String>,
    pub content: Option<String>,
    pub text: Option<String>,
}

impl HistoryEntry {
    pub fn into_turn(self) -> ChatTurn {
        let role = match self.role.as_deref() {
            Some("user") => Role::User,
            _ => Role::Model,
        };
        let text = self.content.or(self.text).unwrap_or_default();

        ChatTurn { role, text }
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let Json(request) =
        payload.map_err(|_| AppError::Validation("Message is required".to_string()))?;
    request.validate()?;

    let history = replay_history(request.history)?;

    let chat_request = ChatRequest {
        system_instruction: request
            .system_instruction
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        history,
        message: request.message,
        params: GenerationParams {
            temperature: Some(0.7),
            max_tokens: Some(1024),
        },
    };

    let model = state.model.get().await?;
    let text = model.chat(&chat_request).await?;

    Ok(Json(ApiResponse::success(text)))
}

/// Map the raw history value to replayed turns. Absent history yields an
/// empty turn list, which the provider layer sends as "no history".
fn replay_history(history: Option<serde_json::Value>) -> Result<Vec<ChatTurn>, AppError> {
    let Some(value) = history else {
        return Ok(Vec::new());
    };

    if !value.is_array() {
        return Err(AppError::Validation("History must be an array".to_string()));
    }

    let entries: Vec<HistoryEntry> = serde_json::from_value(value)
        .map_err(|_| AppError::Validation("History must be an array".to_string()))?;

    Ok(entries.into_iter().map(HistoryEntry::into_turn).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_takes_precedence_over_text() {
        let turn = HistoryEntry {
            role: Some("user".to_string()),
            content: Some("Hi".to_string()),
            text: Some("ignored".to_string()),
        }
        .into_turn();

        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text, "Hi");
    }

    #[test]
    fn unknown_roles_default_to_model() {
        let assistant = HistoryEntry {
            role: Some("assistant".to_string()),
            content: None,
            text: Some("Hello".to_string()),
        }
        .into_turn();
        let missing = HistoryEntry::default().into_turn();

        assert_eq!(assistant.role, Role::Model);
        assert_eq!(assistant.text, "Hello");
        assert_eq!(missing.role, Role::Model);
        assert_eq!(missing.text, "");
    }

    #[test]
    fn absent_history_replays_nothing() {
        assert!(replay_history(None).expect("ok").is_empty());
    }

    #[test]
    fn non_array_history_is_rejected() {
        let err = replay_history(Some(json!("not an array"))).expect_err("rejected");
        assert!(matches!(
            err,
            AppError::Validation(msg) if msg == "History must be an array"
        ));
    }

    #[test]
    fn mixed_roles_map_to_user_and_model() {
        let turns = replay_history(Some(json!([
            { "role": "user", "content": "Hi" },
            { "role": "assistant", "text": "Hello" },
        ])))
        .expect("ok");

        assert_eq!(
            turns,
            vec![
                ChatTurn {
                    role: Role::User,
                    text: "Hi".to_string()
                },
                ChatTurn {
                    role: Role::Model,
                    text: "Hello".to_string()
                },
            ]
        );
    }
}
