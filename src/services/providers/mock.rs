//! Mock model implementation for testing and keyless development.

use super::{
    ChatRequest, GenerationParams, GenerativeModel, InlineAudio, ProviderError,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock generative model.
///
/// Records every call so tests can assert how (and whether) handlers reach
/// the downstream model.
pub struct MockModel {
    enabled: bool,
    calls: AtomicUsize,
    last_chat: Mutex<Option<ChatRequest>>,
    last_audio: Mutex<Option<InlineAudio>>,
}

impl MockModel {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            calls: AtomicUsize::new(0),
            last_chat: Mutex::new(None),
            last_audio: Mutex::new(None),
        }
    }

    /// Number of downstream calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent chat request, if any.
    pub fn last_chat(&self) -> Option<ChatRequest> {
        self.last_chat.lock().expect("lock poisoned").clone()
    }

    /// The most recent inline audio attachment, if any.
    pub fn last_audio(&self) -> Option<InlineAudio> {
        self.last_audio.lock().expect("lock poisoned").clone()
    }

    fn check_enabled(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock model not enabled".to_string(),
            ))
        }
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.check_enabled()?;
        Ok(format!("Mock response for: {}", prompt))
    }

    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &InlineAudio,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.check_enabled()?;
        *self.last_audio.lock().expect("lock poisoned") = Some(audio.clone());
        Ok(format!("Mock response for: {}", prompt))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        self.check_enabled()?;
        *self.last_chat.lock().expect("lock poisoned") = Some(request.clone());
        Ok(format!("Mock response for: {}", request.message))
    }
}
