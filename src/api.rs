//! HTTP API for the astrologer chat
//!
//! Registration, hosted conversation sessions, and the application shell.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::Mode;
use crate::llm::ApiCredential;
use crate::registration::RegistrationStore;
use crate::runtime::SessionManager;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub registrations: RegistrationStore,
    /// The key the model client reads on every call
    pub credential: Arc<ApiCredential>,
    pub mode: Mode,
    pub shell_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager>,
        registrations: RegistrationStore,
        credential: Arc<ApiCredential>,
        mode: Mode,
        shell_dir: PathBuf,
    ) -> Self {
        Self {
            sessions,
            registrations,
            credential,
            mode,
            shell_dir: Arc::new(shell_dir),
        }
    }
}
