//! Runtime for hosted conversation sessions
//!
//! Each visitor conversation is an explicitly constructed session object;
//! the manager only maps ids to sessions.

mod session;

#[cfg(test)]
pub mod testing;

pub use session::{ConversationSession, SessionSnapshot, TranscriptEntry};

use crate::llm::LlmService;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Upper bound on live sessions; the oldest is dropped beyond it
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Default)]
struct SessionTable {
    sessions: HashMap<String, Arc<ConversationSession>>,
    /// Ids in creation order
    order: VecDeque<String>,
}

/// Manager for all conversation sessions
pub struct SessionManager {
    llm: Arc<dyn LlmService>,
    voice: String,
    max_sessions: usize,
    table: RwLock<SessionTable>,
}

impl SessionManager {
    pub fn new(llm: Arc<dyn LlmService>, voice: impl Into<String>) -> Self {
        Self::with_capacity(llm, voice, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_capacity(llm: Arc<dyn LlmService>, voice: impl Into<String>, max_sessions: usize) -> Self {
        Self {
            llm,
            voice: voice.into(),
            max_sessions: max_sessions.max(1),
            table: RwLock::new(SessionTable::default()),
        }
    }

    /// Create a fresh session in the first onboarding stage
    pub async fn create(&self) -> Arc<ConversationSession> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(ConversationSession::new(
            id.clone(),
            Arc::clone(&self.llm),
            self.voice.clone(),
        ));

        let mut table = self.table.write().await;
        table.sessions.insert(id.clone(), Arc::clone(&session));
        table.order.push_back(id.clone());
        while table.order.len() > self.max_sessions {
            if let Some(evicted) = table.order.pop_front() {
                table.sessions.remove(&evicted);
                tracing::info!(session_id = %evicted, "Evicted oldest session");
            }
        }
        drop(table);

        tracing::info!(session_id = %id, "Session created");
        session
    }

    pub async fn get(&self, id: &str) -> Option<Arc<ConversationSession>> {
        self.table.read().await.sessions.get(id).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.table.read().await.sessions.len()
    }
}
