//! Pure state transition function
//!
//! Given the same state and event it always yields the same new state and
//! effects. Timestamps and collaborator calls belong to the executor.

use super::{ConversationState, Effect, Event, Stage};
use crate::llm::LlmErrorKind;
use crate::persona;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is still being prepared, wait for it before sending more")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &ConversationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UserInput { text } => {
            let answer = text.trim();
            if answer.is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            if state.busy {
                return Err(TransitionError::Busy);
            }

            match &state.stage {
                // The whole answer is the name; nothing is parsed or validated
                Stage::AwaitingName => {
                    let name = answer.to_string();
                    let prompt = persona::ask_date_of_birth(&name);
                    Ok(TransitionResult::new(ConversationState {
                        stage: Stage::AwaitingDob { name },
                        busy: false,
                    })
                    .with_effect(Effect::user_said(text.clone()))
                    .with_effect(Effect::assistant_said(prompt)))
                }

                // Any string is accepted as a date of birth, malformed or not
                Stage::AwaitingDob { name } => {
                    let date_of_birth = answer.to_string();
                    let confirmation = persona::confirm_ready(&date_of_birth);
                    Ok(TransitionResult::new(ConversationState {
                        stage: Stage::Ready {
                            name: name.clone(),
                            date_of_birth,
                        },
                        busy: false,
                    })
                    .with_effect(Effect::user_said(text.clone()))
                    .with_effect(Effect::assistant_said(confirmation)))
                }

                Stage::Ready { .. } => {
                    let profile = state.profile();
                    Ok(TransitionResult::new(ConversationState {
                        stage: state.stage.clone(),
                        busy: true,
                    })
                    .with_effect(Effect::user_said(text.clone()))
                    .with_effect(Effect::RequestReply {
                        prompt: answer.to_string(),
                        system: persona::chat_instruction(profile.as_ref()),
                    }))
                }
            }
        }

        Event::ReplyReceived { text } if state.busy => {
            let reply = if text.trim().is_empty() {
                persona::EMPTY_REPLY.to_string()
            } else {
                text
            };
            Ok(TransitionResult::new(idle(state)).with_effect(Effect::assistant_said(reply)))
        }

        // The stage reached before the call is kept; the visitor can simply ask again
        Event::ReplyFailed { kind } if state.busy => {
            Ok(TransitionResult::new(idle(state))
                .with_effect(Effect::assistant_said(apology(kind))))
        }

        Event::ReplyReceived { .. } | Event::ReplyFailed { .. } => {
            Err(TransitionError::InvalidTransition(format!(
                "no reply outstanding in stage {}",
                state.stage.as_str()
            )))
        }
    }
}

fn idle(state: &ConversationState) -> ConversationState {
    ConversationState {
        stage: state.stage.clone(),
        busy: false,
    }
}

/// User-visible apology for a failed collaborator call
pub fn apology(kind: LlmErrorKind) -> &'static str {
    match kind {
        LlmErrorKind::QuotaExceeded => persona::QUOTA_APOLOGY,
        _ => persona::GENERIC_APOLOGY,
    }
}
