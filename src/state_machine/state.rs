//! Conversation state types

use serde::{Deserialize, Serialize};

/// Onboarding stage. Advances `AwaitingName -> AwaitingDob -> Ready` and never
/// goes back. Each stage carries exactly the answers collected so far, so a
/// date of birth cannot exist without a name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    AwaitingName,
    AwaitingDob {
        name: String,
    },
    Ready {
        name: String,
        date_of_birth: String,
    },
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AwaitingName => "awaiting_name",
            Stage::AwaitingDob { .. } => "awaiting_dob",
            Stage::Ready { .. } => "ready",
        }
    }

    /// Position in the onboarding sequence, for ordering checks
    #[cfg(test)]
    pub fn rank(&self) -> u8 {
        match self {
            Stage::AwaitingName => 0,
            Stage::AwaitingDob { .. } => 1,
            Stage::Ready { .. } => 2,
        }
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(self, Stage::Ready { .. })
    }
}

/// Visitor details gathered during onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub date_of_birth: Option<String>,
}

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// In-memory state of one conversation session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationState {
    pub stage: Stage,
    /// Set while a collaborator request is outstanding
    pub busy: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile view of the collected answers, `None` before a name is given
    pub fn profile(&self) -> Option<Profile> {
        match &self.stage {
            Stage::AwaitingName => None,
            Stage::AwaitingDob { name } => Some(Profile {
                name: name.clone(),
                date_of_birth: None,
            }),
            Stage::Ready {
                name,
                date_of_birth,
            } => Some(Profile {
                name: name.clone(),
                date_of_birth: Some(date_of_birth.clone()),
            }),
        }
    }
}
