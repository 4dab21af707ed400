//! Mock implementations for testing
//!
//! These mocks enable session and API testing without real I/O.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, SpeechAudio, SpeechRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    speech: Mutex<VecDeque<Result<SpeechAudio, LlmError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
    speech_requests: Mutex<Vec<SpeechRequest>>,
    /// When set, each completion waits for a permit before answering
    gate: Option<Semaphore>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            speech: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            speech_requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Completions block until `release` is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Let one gated completion through
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_speech(&self, result: Result<SpeechAudio, LlmError>) {
        self.speech.lock().unwrap().push_back(result);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn recorded_speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().unwrap().clone()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio, LlmError> {
        self.speech_requests.lock().unwrap().push(request.clone());
        self.speech
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock speech queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}
