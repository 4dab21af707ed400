//! Conversation session executor
//!
//! Owns one visitor's state, transcript and horoscope slots, feeds events
//! through the pure transition function and carries out the resulting effects.

use crate::llm::{LlmError, LlmErrorKind, LlmRequest, LlmService, SpeechAudio, SpeechRequest};
use crate::persona::{self, Rashi};
use crate::state_machine::{
    transition, ConversationState, Effect, Event, Profile, Speaker, TransitionError,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One line of the visible chat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub stage: &'static str,
    pub profile: Option<Profile>,
    pub busy: bool,
    pub transcript: Vec<TranscriptEntry>,
    pub horoscopes: BTreeMap<Rashi, String>,
}

struct SessionInner {
    state: ConversationState,
    transcript: Vec<TranscriptEntry>,
    horoscopes: BTreeMap<Rashi, String>,
}

pub struct ConversationSession {
    id: String,
    llm: Arc<dyn LlmService>,
    voice: String,
    inner: Mutex<SessionInner>,
}

impl ConversationSession {
    /// Start a session in `AwaitingName`, greeted by the assistant
    pub fn new(id: impl Into<String>, llm: Arc<dyn LlmService>, voice: impl Into<String>) -> Self {
        let greeting = TranscriptEntry {
            speaker: Speaker::Assistant,
            text: persona::GREETING.to_string(),
            sent_at: Utc::now(),
        };
        Self {
            id: id.into(),
            llm,
            voice: voice.into(),
            inner: Mutex::new(SessionInner {
                state: ConversationState::new(),
                transcript: vec![greeting],
                horoscopes: BTreeMap::new(),
            }),
        }
    }

    #[cfg(test)]
    pub fn id(&self) -> &str {
        &self.id
    }

    // The lock is never held across an await, so a poisoned guard still holds consistent data
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            id: self.id.clone(),
            stage: inner.state.stage.as_str(),
            profile: inner.state.profile(),
            busy: inner.state.busy,
            transcript: inner.transcript.clone(),
            horoscopes: inner.horoscopes.clone(),
        }
    }

    pub fn state(&self) -> ConversationState {
        self.lock().state.clone()
    }

    /// Submit visitor input.
    ///
    /// Returns the transcript entries appended on behalf of this call. Blank
    /// input and input arriving while a reply is outstanding are rejected
    /// without touching the session. The collaborator call runs on its own
    /// task, so it completes and clears the busy flag even if the caller
    /// stops waiting.
    pub async fn submit(self: &Arc<Self>, text: &str) -> Result<Vec<TranscriptEntry>, TransitionError> {
        let (mut appended, request) = self.apply(Event::UserInput {
            text: text.to_string(),
        })?;

        let Some(request) = request else {
            return Ok(appended);
        };

        let session = Arc::clone(self);
        let reply = tokio::spawn(async move {
            let event = match session.llm.complete(&request).await {
                Ok(response) => Event::ReplyReceived {
                    text: response.text,
                },
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id,
                        kind = e.kind.as_str(),
                        error = %e,
                        "Reply failed"
                    );
                    Event::ReplyFailed { kind: e.kind }
                }
            };
            session.apply(event).map(|(entries, _)| entries)
        });

        match reply.await {
            Ok(result) => appended.extend(result?),
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Reply task aborted");
                let (entries, _) = self.apply(Event::ReplyFailed {
                    kind: LlmErrorKind::Unknown,
                })?;
                appended.extend(entries);
            }
        }

        Ok(appended)
    }

    /// Run one event through the state machine and execute its effects.
    fn apply(
        &self,
        event: Event,
    ) -> Result<(Vec<TranscriptEntry>, Option<LlmRequest>), TransitionError> {
        let mut inner = self.lock();
        let result = transition(&inner.state, event)?;

        if result.new_state.stage != inner.state.stage {
            tracing::info!(
                session_id = %self.id,
                from = inner.state.stage.as_str(),
                to = result.new_state.stage.as_str(),
                "Onboarding advanced"
            );
        }
        inner.state = result.new_state;

        let mut appended = Vec::new();
        let mut request = None;
        for effect in result.effects {
            match effect {
                Effect::AppendTranscript { speaker, text } => {
                    let entry = TranscriptEntry {
                        speaker,
                        text,
                        sent_at: Utc::now(),
                    };
                    inner.transcript.push(entry.clone());
                    appended.push(entry);
                }
                Effect::RequestReply { prompt, system } => {
                    request = Some(LlmRequest::new(prompt).with_system(system));
                }
            }
        }

        Ok((appended, request))
    }

    /// One-shot themed reading for a sign.
    ///
    /// Independent of onboarding: never checks or sets the busy flag and
    /// never writes to the transcript. The sign's slot shows a pending text
    /// until the reply (or a fixed failure text) overwrites it.
    pub async fn ask_horoscope(self: &Arc<Self>, rashi: Rashi) -> String {
        let profile = {
            let mut inner = self.lock();
            inner
                .horoscopes
                .insert(rashi, persona::HOROSCOPE_PENDING.to_string());
            inner.state.profile()
        };

        let request = LlmRequest::new(persona::horoscope_prompt(rashi))
            .with_system(persona::horoscope_instruction(profile.as_ref()));

        let session = Arc::clone(self);
        let reading = tokio::spawn(async move {
            let text = match session.llm.complete(&request).await {
                Ok(response) => response
                    .non_empty_text()
                    .map_or_else(|| persona::HOROSCOPE_EMPTY.to_string(), str::to_string),
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id,
                        rashi = %rashi,
                        kind = e.kind.as_str(),
                        error = %e,
                        "Horoscope request failed"
                    );
                    persona::HOROSCOPE_FAILED.to_string()
                }
            };
            session.lock().horoscopes.insert(rashi, text.clone());
            text
        });

        match reading.await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Horoscope task aborted");
                let text = persona::HOROSCOPE_FAILED.to_string();
                self.lock().horoscopes.insert(rashi, text.clone());
                text
            }
        }
    }

    /// Render a reply as speech in the persona's voice
    pub async fn narrate(&self, text: &str) -> Result<SpeechAudio, LlmError> {
        let request = SpeechRequest {
            text: persona::speech_prompt(text),
            voice: self.voice.clone(),
        };
        self.llm.synthesize(&request).await
    }

    /// Tell the visitor that a new API key was selected
    pub fn credential_updated(&self) -> TranscriptEntry {
        let entry = TranscriptEntry {
            speaker: Speaker::Assistant,
            text: persona::CREDENTIAL_UPDATED.to_string(),
            sent_at: Utc::now(),
        };
        self.lock().transcript.push(entry.clone());
        entry
    }
}
