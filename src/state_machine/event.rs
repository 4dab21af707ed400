//! Events that can occur in a conversation

use crate::llm::LlmErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Visitor submitted text (raw, untrimmed)
    UserInput { text: String },

    /// Collaborator answered the outstanding request
    ReplyReceived { text: String },

    /// Collaborator request failed
    ReplyFailed { kind: LlmErrorKind },
}
