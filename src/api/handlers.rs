//! HTTP request handlers

use super::assets::serve_shell;
use super::types::{
    CredentialRequest, CredentialResponse, ErrorResponse, HealthResponse, HoroscopeResponse,
    MessageRequest, MessageResponse, RashiInfo, RashiListResponse, RegisterResponse, SpeechBody,
    SpeechResponse,
};
use super::AppState;
use crate::persona::{Rashi, UnknownRashi};
use crate::registration::{NewVisitor, StoreError};
use crate::runtime::{ConversationSession, SessionSnapshot};
use crate::state_machine::TransitionError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Registration
        .route("/api/register", post(register))
        .route("/api/health", get(health))
        .route("/api/rashis", get(list_rashis))
        // Conversation sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/horoscope/:rashi", post(ask_horoscope))
        .route("/api/sessions/:id/speech", post(synthesize_speech))
        .route("/api/sessions/:id/credential", post(update_credential))
        .route("/api/*rest", any(api_not_found))
        // Everything else is the application shell
        .fallback(serve_shell)
        .with_state(state)
}

// ============================================================
// Registration
// ============================================================

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<NewVisitor>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let visitor = match payload {
        Ok(Json(visitor)) => visitor,
        // A body that is missing or not an object carries no name or email
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable registration body");
            NewVisitor::default()
        }
    };

    let store = state.registrations.clone();
    let record = tokio::task::spawn_blocking(move || store.register(visitor))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Registration task failed");
            AppError::internal()
        })?
        .map_err(|e| match e {
            StoreError::MissingField | StoreError::DuplicateEmail => {
                AppError::BadRequest(e.to_string())
            }
            other => {
                tracing::error!(error = %other, "Registration error");
                AppError::internal()
            }
        })?;

    Ok(Json(RegisterResponse {
        success: true,
        user_id: record.id,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: state.mode.as_str(),
    })
}

async fn list_rashis() -> Json<RashiListResponse> {
    Json(RashiListResponse {
        rashis: Rashi::ALL
            .into_iter()
            .map(|r| RashiInfo {
                id: r.id(),
                label: r.label(),
                symbol: r.symbol(),
                outlook: r.outlook(),
            })
            .collect(),
    })
}

// ============================================================
// Conversation Sessions
// ============================================================

/// Unwrap a JSON body, reporting rejections in the usual error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn find_session(state: &AppState, id: &str) -> Result<Arc<ConversationSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

async fn create_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let session = state.sessions.create().await;
    Json(session.snapshot())
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(session.snapshot()))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let req = json_body(payload)?;

    let entries = session.submit(&req.text).await.map_err(|e| match e {
        TransitionError::EmptyInput => AppError::BadRequest(e.to_string()),
        TransitionError::Busy => AppError::Conflict(e.to_string()),
        TransitionError::InvalidTransition(_) => {
            tracing::error!(session_id = %id, error = %e, "Unexpected transition failure");
            AppError::internal()
        }
    })?;

    let current = session.state();
    Ok(Json(MessageResponse {
        entries,
        stage: current.stage.as_str(),
        busy: current.busy,
    }))
}

async fn ask_horoscope(
    State(state): State<AppState>,
    Path((id, rashi)): Path<(String, String)>,
) -> Result<Json<HoroscopeResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let rashi: Rashi = rashi
        .parse()
        .map_err(|e: UnknownRashi| AppError::NotFound(e.to_string()))?;

    let text = session.ask_horoscope(rashi).await;
    Ok(Json(HoroscopeResponse {
        rashi: rashi.id(),
        label: rashi.label(),
        text,
    }))
}

async fn synthesize_speech(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SpeechBody>, JsonRejection>,
) -> Result<Json<SpeechResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let req = json_body(payload)?;
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Text is required".to_string()));
    }

    let audio = session
        .narrate(&req.text)
        .await
        .map_err(|e| AppError::BadGateway(format!("Speech unavailable ({})", e.kind.as_str())))?;

    Ok(Json(SpeechResponse {
        audio: audio.data,
        mime_type: audio.mime_type,
    }))
}

async fn update_credential(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CredentialRequest>, JsonRejection>,
) -> Result<Json<CredentialResponse>, AppError> {
    let session = find_session(&state, &id).await?;
    let req = json_body(payload)?;
    if !state.credential.replace(&req.api_key) {
        return Err(AppError::BadRequest("API key is required".to_string()));
    }
    tracing::info!(session_id = %id, "API credential replaced");

    Ok(Json(CredentialResponse {
        success: true,
        notice: session.credential_updated(),
    }))
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl AppError {
    /// Internal failure with the details kept out of the response
    fn internal() -> Self {
        AppError::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
