//! LLM provider abstraction
//!
//! The generative model is an opaque collaborator: a request goes in, text or
//! audio comes out, or a classified error.

mod credential;
mod error;
mod gemini;
mod types;

pub use credential::ApiCredential;
pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiService, GeminiSettings};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a text completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Render text as speech using the provider's audio modality
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.synthesize(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(audio) => {
                tracing::info!(
                    voice = %request.voice,
                    duration_ms = %duration.as_millis(),
                    mime_type = %audio.mime_type,
                    "Speech request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    voice = %request.voice,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Speech request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
