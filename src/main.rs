//! Jyotishi - Vedic astrologer chat service
//!
//! Hosts the onboarding conversation, the sign catalogue queries and the
//! visitor registry behind one HTTP server.

mod api;
mod config;
mod llm;
mod persona;
mod registration;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::AppConfig;
use llm::{ApiCredential, GeminiService, LlmService, LoggingService};
use registration::RegistrationStore;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jyotishi=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(mode = %config.mode, "Configuration loaded");

    // Registration store
    let registrations = RegistrationStore::open(&config.registry_path)?;

    // Model client
    let credential = Arc::new(ApiCredential::new(config.gemini_api_key.clone()));
    let gemini: Arc<dyn LlmService> =
        Arc::new(GeminiService::new(Arc::clone(&credential), config.gemini.clone())?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(gemini));
    tracing::info!(
        model = %llm.model_id(),
        voice = %config.voice,
        credential_set = credential.is_set(),
        "LLM service initialized"
    );

    let sessions = Arc::new(SessionManager::new(llm, config.voice.clone()));
    let state = AppState::new(
        sessions,
        registrations,
        credential,
        config.mode,
        config.shell_dir.clone(),
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(mode = %config.mode, "Server running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
