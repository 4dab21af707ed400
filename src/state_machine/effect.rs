//! Effects produced by state transitions

use super::state::Speaker;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an entry to the transcript, stamped when executed
    AppendTranscript { speaker: Speaker, text: String },

    /// Send a free-form query to the collaborator
    RequestReply { prompt: String, system: String },
}

impl Effect {
    pub fn user_said(text: impl Into<String>) -> Self {
        Effect::AppendTranscript {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant_said(text: impl Into<String>) -> Self {
        Effect::AppendTranscript {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}
