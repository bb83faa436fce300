//! Generative model abstractions and implementations.
//!
//! This module provides a trait-based abstraction over the generative
//! backend, allowing easy swapping between Gemini and a mock.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Generation parameters for model requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Who produced a conversation turn, in the model's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One replayed conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// A conversational request: replayed history plus one new user message.
///
/// An empty `history` means the downstream request carries only the new
/// message, never an empty replayed-turn list.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_instruction: String,
    pub history: Vec<ChatTurn>,
    pub message: String,
    pub params: GenerationParams,
}

/// Inline audio attachment, forwarded base64-encoded and unvalidated.
#[derive(Debug, Clone)]
pub struct InlineAudio {
    pub mime_type: String,
    pub data: String,
}

/// Trait for generative text backends (e.g., Gemini).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Single-shot text generation from a plain prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    /// Multi-part generation: a text instruction plus an inline audio clip.
    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &InlineAudio,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    /// Conversational generation with replayed history and a system persona.
    async fn chat(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}
