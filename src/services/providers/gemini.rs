//! Gemini provider implementation.
//!
//! Implements text, chat, and text+audio generation over Google's
//! `generateContent` REST API.

use super::{
    ChatRequest, GenerationParams, GenerativeModel, InlineAudio, ProviderError, Role,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Gemini-backed generative model.
pub struct GeminiModel {
    config: GeminiConfig,
    client: Client,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }

    /// Issue one `generateContent` call and extract the response text.
    async fn send(&self, request: GenerateContentRequest) -> Result<String, ProviderError> {
        let url = self.api_url("generateContent");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let candidate = api_response
            .candidates
            .first()
            .ok_or_else(|| ProviderError::ApiError("Response contained no candidates".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::ContentFiltered);
        }

        candidate
            .content
            .parts
            .iter()
            .find_map(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| ProviderError::ApiError("Response contained no text".to_string()))
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        self.send(build_generate_request(prompt, None, params)).await
    }

    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &InlineAudio,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            audio_len = audio.data.len(),
            "Sending multi-part request to Gemini API"
        );

        self.send(build_generate_request(prompt, Some(audio), params))
            .await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            history_turns = request.history.len(),
            message_len = request.message.len(),
            "Sending chat request to Gemini API"
        );

        self.send(build_chat_request(request)).await
    }
}

/// Build a single-shot request, optionally attaching inline audio.
fn build_generate_request(
    prompt: &str,
    audio: Option<&InlineAudio>,
    params: &GenerationParams,
) -> GenerateContentRequest {
    let mut parts = vec![ContentPart::Text {
        text: prompt.to_string(),
    }];

    if let Some(audio) = audio {
        parts.push(ContentPart::InlineData {
            inline_data: InlineData {
                mime_type: audio.mime_type.clone(),
                data: audio.data.clone(),
            },
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: Some(Role::User.as_str().to_string()),
            parts,
        }],
        system_instruction: None,
        generation_config: build_generation_config(params),
    }
}

/// Build a chat request from replayed history plus the new user turn.
///
/// An empty history produces a request whose `contents` holds only the new
/// message, matching a session started without history.
fn build_chat_request(request: &ChatRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request
        .history
        .iter()
        .map(|turn| Content {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![ContentPart::Text {
                text: turn.text.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: Some(Role::User.as_str().to_string()),
        parts: vec![ContentPart::Text {
            text: request.message.clone(),
        }],
    });

    GenerateContentRequest {
        contents,
        system_instruction: Some(SystemInstruction {
            parts: vec![ContentPart::Text {
                text: request.system_instruction.clone(),
            }],
        }),
        generation_config: build_generation_config(&request.params),
    }
}

fn build_generation_config(params: &GenerationParams) -> Option<GenerationConfig> {
    if params.temperature.is_none() && params.max_tokens.is_none() {
        return None;
    }

    Some(GenerationConfig {
        temperature: params.temperature,
        max_output_tokens: params.max_tokens,
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ChatTurn;

    fn chat_request(history: Vec<ChatTurn>) -> ChatRequest {
        ChatRequest {
            system_instruction: "You are a helpful English learning assistant.".to_string(),
            history,
            message: "How do I use 'although'?".to_string(),
            params: GenerationParams {
                temperature: Some(0.7),
                max_tokens: Some(1024),
            },
        }
    }

    #[test]
    fn chat_request_replays_history_before_new_message() {
        let request = chat_request(vec![
            ChatTurn {
                role: Role::User,
                text: "Hi".to_string(),
            },
            ChatTurn {
                role: Role::Model,
                text: "Hello".to_string(),
            },
        ]);

        let wire = build_chat_request(&request);

        assert_eq!(wire.contents.len(), 3);
        assert_eq!(wire.contents[0].role.as_deref(), Some("user"));
        assert_eq!(wire.contents[1].role.as_deref(), Some("model"));
        assert_eq!(wire.contents[2].role.as_deref(), Some("user"));
        match &wire.contents[2].parts[0] {
            ContentPart::Text { text } => assert_eq!(text, "How do I use 'although'?"),
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn chat_request_with_empty_history_carries_only_new_message() {
        let wire = build_chat_request(&chat_request(Vec::new()));

        assert_eq!(wire.contents.len(), 1);
        assert_eq!(wire.contents[0].role.as_deref(), Some("user"));

        let json = serde_json::to_value(&wire).expect("serializes");
        assert_eq!(json["contents"].as_array().expect("array").len(), 1);
    }

    #[test]
    fn chat_request_carries_system_instruction_and_params() {
        let wire = build_chat_request(&chat_request(Vec::new()));

        let json = serde_json::to_value(&wire).expect("serializes");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a helpful English learning assistant."
        );
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn plain_generate_request_has_no_generation_config_by_default() {
        let wire = build_generate_request("Say hello", None, &GenerationParams::default());

        let json = serde_json::to_value(&wire).expect("serializes");
        assert!(json.get("generationConfig").is_none());
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Say hello");
    }

    #[test]
    fn audio_request_attaches_inline_data_after_prompt() {
        let audio = InlineAudio {
            mime_type: "audio/mp3".to_string(),
            data: "bm90LXJlYWxseS1hdWRpbw==".to_string(),
        };
        let wire = build_generate_request("Analyze this", Some(&audio), &GenerationParams::default());

        let json = serde_json::to_value(&wire).expect("serializes");
        let parts = json["contents"][0]["parts"].as_array().expect("array");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "audio/mp3");
        assert_eq!(parts[1]["inlineData"]["data"], "bm90LXJlYWxseS1hdWRpbw==");
    }
}
