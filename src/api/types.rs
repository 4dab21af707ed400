//! API request and response types

use crate::runtime::TranscriptEntry;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: String,
}

/// Request to render text as speech
#[derive(Debug, Deserialize)]
pub struct SpeechBody {
    #[serde(default)]
    pub text: String,
}

/// Request to re-select the API credential
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: String,
}

/// Response for a successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
}

/// Entries appended by one submission
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub entries: Vec<TranscriptEntry>,
    pub stage: &'static str,
    pub busy: bool,
}

#[derive(Debug, Serialize)]
pub struct HoroscopeResponse {
    pub rashi: &'static str,
    pub label: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    /// Base64 encoded audio
    pub audio: String,
    pub mime_type: String,
}

/// One card in the sign catalogue
#[derive(Debug, Serialize)]
pub struct RashiInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub symbol: &'static str,
    pub outlook: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RashiListResponse {
    pub rashis: Vec<RashiInfo>,
}

/// Response for a credential update
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub success: bool,
    pub notice: TranscriptEntry,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
