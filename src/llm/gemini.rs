//! Google Gemini provider implementation

use super::types::{LlmRequest, LlmResponse, SpeechAudio, SpeechRequest, Usage};
use super::{ApiCredential, LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Endpoint and model selection for the Gemini API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    pub base_url: String,
    pub chat_model: String,
    pub speech_model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
        }
    }
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    credential: Arc<ApiCredential>,
    base_url: String,
    chat_model: String,
    speech_model: String,
}

impl GeminiService {
    pub fn new(credential: Arc<ApiCredential>, settings: GeminiSettings) -> Result<Self, LlmError> {
        // No request timeout: calls run until the network stack gives up.
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credential,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            chat_model: settings.chat_model,
            speech_model: settings.speech_model,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::user(request.prompt.clone())],
            system_instruction: request
                .system
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| GeminiContent {
                    role: None,
                    parts: vec![GeminiPart::Text { text: s.clone() }],
                }),
            generation_config: None,
        }
    }

    fn translate_speech_request(request: &SpeechRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::user(request.text.clone())],
            system_instruction: None,
            generation_config: Some(GeminiGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: GeminiSpeechConfig {
                    voice_config: GeminiVoiceConfig {
                        prebuilt_voice_config: GeminiPrebuiltVoice {
                            voice_name: request.voice.clone(),
                        },
                    },
                },
            }),
        }
    }

    fn normalize_response(resp: GeminiResponse) -> LlmResponse {
        let text = resp
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| match part {
                        GeminiPart::Text { text } => Some(text),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default();

        let usage = resp.usage_metadata.unwrap_or_default();

        LlmResponse {
            text,
            usage: Usage {
                input_tokens: u64::from(usage.prompt_token_count),
                output_tokens: u64::from(usage.candidates_token_count),
            },
        }
    }

    fn extract_audio(resp: GeminiResponse) -> Result<SpeechAudio, LlmError> {
        resp.candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|part| match part {
                GeminiPart::InlineData { inline_data } => Some(SpeechAudio {
                    data: inline_data.data,
                    mime_type: inline_data.mime_type,
                }),
                _ => None,
            })
            .ok_or_else(|| LlmError::malformed("No audio data in response"))
    }

    async fn generate(&self, model: &str, body: &GeminiRequest) -> Result<GeminiResponse, LlmError> {
        let api_key = self
            .credential
            .get()
            .ok_or_else(|| LlmError::auth("No API key configured"))?;

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<GeminiErrorResponse>(&body) {
                Ok(error_resp) => classify_error(
                    status.as_u16(),
                    error_resp.error.status.as_deref(),
                    &error_resp.error.message,
                ),
                Err(_) => classify_error(status.as_u16(), None, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            LlmError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

/// Map an error response onto an error kind.
fn classify_error(status: u16, api_status: Option<&str>, message: &str) -> LlmError {
    let mentions_quota = message.to_ascii_lowercase().contains("quota");
    if status == 429 || api_status == Some("RESOURCE_EXHAUSTED") || mentions_quota {
        return LlmError::quota_exceeded(format!("Quota exceeded: {message}"));
    }
    match status {
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = Self::translate_request(request);
        let response = self.generate(&self.chat_model, &body).await?;
        Ok(Self::normalize_response(response))
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio, LlmError> {
        let body = Self::translate_speech_request(request);
        let response = self.generate(&self.speech_model, &body).await?;
        Self::extract_audio(response)
    }

    fn model_id(&self) -> &str {
        &self.chat_model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPart::Text { text }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: GeminiSpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiSpeechConfig {
    voice_config: GeminiVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiVoiceConfig {
    prebuilt_voice_config: GeminiPrebuiltVoice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPrebuiltVoice {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    status: Option<String>,
}
