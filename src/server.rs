use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::backend::HttpBackend;
use crate::config::AppConfig;
use crate::render::{render_outcome, render_page, render_submission};
use crate::session::{Session, SessionStore};
use crate::widget::{DESIGN_FILE_NAME, Entry, SubmissionId, send_and_render};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend.base_url, &config.backend.chat_path)?;
    info!(
        name: "backend.config.loaded",
        endpoint = %backend.endpoint(),
        "Backend configuration loaded"
    );

    let state = AppState {
        backend: Arc::new(backend),
        sessions: SessionStore::new(),
        config: Arc::clone(&config),
    };

    let _sweeper = spawn_session_sweeper(
        state.sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
        Duration::from_secs(config.session.timeout_secs),
    );

    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    Router::new()
        // HTML pages and fragments
        .route("/", get(index_handler))
        .route("/chat/{session_id}", get(chat_page))
        .route("/chat/{session_id}/messages", post(post_message))
        .route(
            "/chat/{session_id}/submissions/{submission_id}",
            get(poll_submission),
        )
        .route("/chat/{session_id}/designs/{image_id}", get(design_image))
        .route(
            "/chat/{session_id}/designs/{image_id}/download",
            get(design_download),
        )
        // JSON API
        .route("/api/sessions/{session_id}/entries", get(api_get_entries))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop sessions idle for longer than `timeout`.
pub fn spawn_session_sweeper(
    sessions: SessionStore,
    every: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired_with_timeout(timeout);
            if removed > 0 {
                info!(
                    name: "session.sweep",
                    removed,
                    remaining = sessions.len(),
                    "Expired sessions removed"
                );
            }
        }
    })
}

fn existing_session(state: &AppState, id: &str) -> Result<Session, StatusCode> {
    state.sessions.get(id).ok_or(StatusCode::NOT_FOUND)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET / - Start a fresh session.
async fn index_handler(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create();
    Redirect::to(&format!("/chat/{}", session.id()))
}

/// GET /chat/{id} - Chat page, creating the session on first visit.
async fn chat_page(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Html<String> {
    let session = state.sessions.get_or_create(&session_id);
    Html(session.read(|w| render_page(&state.config.ui, session.id(), w)))
}

/// Form body of a submission.
#[derive(Debug, Deserialize)]
struct MessageForm {
    /// Raw input text.
    #[serde(default)]
    message: String,
}

/// POST /chat/{id}/messages - Submit a message.
async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Result<Response, StatusCode> {
    let session = existing_session(&state, &session_id)?;

    let Some(submission) = session.update(|w| w.submit(&form.message)) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    info!(
        name: "chat.submission.accepted",
        session_id = %session.id(),
        submission = %submission.id,
        message = %submission.message,
        "Submission accepted"
    );

    let _exchange = send_and_render(&session, Arc::clone(&state.backend), submission.clone());

    let fragment = session.read(|w| render_submission(session.id(), w, &submission));
    Ok(Html(fragment).into_response())
}

/// GET /chat/{id}/submissions/{submission} - Long-poll a placeholder.
async fn poll_submission(
    State(state): State<AppState>,
    Path((session_id, submission_id)): Path<(String, String)>,
) -> Result<Html<String>, StatusCode> {
    let session = existing_session(&state, &session_id)?;
    let id = SubmissionId::parse(&submission_id).ok_or(StatusCode::NOT_FOUND)?;

    session
        .wait_until_settled(id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Html(session.read(|w| render_outcome(session.id(), w, id))))
}

fn design_payload(
    state: &AppState,
    session_id: &str,
    image_id: &str,
) -> Result<axum::body::Bytes, StatusCode> {
    let session = existing_session(state, session_id)?;
    let id = Uuid::parse_str(image_id)
        .ok()
        .ok_or(StatusCode::NOT_FOUND)?;
    session
        .read(|w| w.image(id).map(|image| image.payload.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// GET /chat/{id}/designs/{image} - Inline design image.
async fn design_image(
    State(state): State<AppState>,
    Path((session_id, image_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let payload = design_payload(&state, &session_id, &image_id)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], payload))
}

/// GET /chat/{id}/designs/{image}/download - Design as an attachment.
async fn design_download(
    State(state): State<AppState>,
    Path((session_id, image_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let payload = design_payload(&state, &session_id, &image_id)?;
    let disposition = format!("attachment; filename=\"{DESIGN_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/sessions/{id}/entries - Snapshot of the chat output.
async fn api_get_entries(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Entry>>, StatusCode> {
    let session = existing_session(&state, &session_id)?;
    Ok(Json(session.read(|w| w.entries().to_vec())))
}
