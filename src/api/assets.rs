//! Application shell serving
//!
//! Files are read from the shell directory on every request. Unknown paths
//! fall back to `index.html` so client-side routes resolve.

use super::AppState;
use crate::config::Mode;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Response, StatusCode, Uri},
    response::IntoResponse,
};
use std::path::{Component, Path, PathBuf};

pub const SHELL_MISSING: &str = "Application not built correctly. Please check build logs.";

/// Resolve a request path inside the shell directory, refusing anything that escapes it
fn resolve(shell_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }
    if relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(shell_dir.join(relative))
    } else {
        None
    }
}

fn cache_control(mode: Mode) -> &'static str {
    match mode {
        // Rebuilt assets show up on the next reload
        Mode::Development => "no-store",
        Mode::Production => "no-cache",
    }
}

/// Serve a static file or the shell document for any non-API GET
pub async fn serve_shell(State(state): State<AppState>, method: Method, uri: Uri) -> Response<Body> {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if let Some(file) = resolve(&state.shell_dir, uri.path()) {
        if let Ok(content) = tokio::fs::read(&file).await {
            let mime = mime_guess::from_path(&file).first_or_octet_stream();
            return (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, cache_control(state.mode).to_string()),
                ],
                content,
            )
                .into_response();
        }
    }

    let index = state.shell_dir.join("index.html");
    match tokio::fs::read(&index).await {
        Ok(content) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CACHE_CONTROL, cache_control(state.mode)),
            ],
            content,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(path = %index.display(), error = %e, "Error sending index.html");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                SHELL_MISSING,
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/dist");
        assert_eq!(resolve(dir, "/assets/app.js"), Some(dir.join("assets/app.js")));
        assert_eq!(resolve(dir, "/"), None);
        assert_eq!(resolve(dir, "/../etc/passwd"), None);
        assert_eq!(resolve(dir, "/assets/../../secret"), None);
    }
}
