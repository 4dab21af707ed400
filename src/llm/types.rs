//! Common types for LLM interactions

/// Single-turn text generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    /// System instruction, sent separately from the user turn
    pub system: Option<String>,
    pub prompt: String,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Text generation response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }

    /// The reply text, or `None` when the model produced nothing usable
    pub fn non_empty_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Request for audio rendering of a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

/// Audio produced by the provider, still base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub data: String,
    pub mime_type: String,
}
