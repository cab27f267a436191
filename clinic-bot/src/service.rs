use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use dialogue_flow::{DialogueState, Event, FlowRunner, InMemorySessionStorage, Session};
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::{
    config::Config,
    gateway::{Backend, BackendGateway},
    models::{EventRequest, EventResponse},
    voice::VoicePipeline,
    workflow::create_flow_runner,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "chat_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub flow_runner: FlowRunner,
    pub voice: Arc<VoicePipeline>,
}

pub fn create_app(config: &Config) -> Router {
    let backend: Arc<dyn Backend> = Arc::new(BackendGateway::from_config(config));
    build_router(create_app_state(backend, config.voices_dir.clone()))
}

pub fn create_app_state(backend: Arc<dyn Backend>, voices_dir: PathBuf) -> AppState {
    let session_storage = Arc::new(InMemorySessionStorage::new());
    let flow_runner = create_flow_runner(backend.clone(), session_storage);

    AppState {
        flow_runner,
        voice: Arc::new(VoicePipeline::new(backend, voices_dir)),
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/events", post(handle_event))
        .route("/sessions/{chat_id}", get(get_session).delete(reset_session))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Clinic Bot",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Menu-driven clinic assistant: doctors, analyses, FAQ and voice questions",
        "endpoints": {
            "POST /events": "Handle one chat event (text, callback, command or voice)",
            "GET /sessions/{chat_id}": "Current dialogue state of a chat",
            "DELETE /sessions/{chat_id}": "Reset a chat to the main menu",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn handle_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> ApiResult<EventResponse> {
    validate_chat_id(&request.chat_id)?;

    let turn_id = Uuid::new_v4();
    let span = info_span!(
        "turn",
        %turn_id,
        chat_id = %request.chat_id,
        kind = request.event.kind()
    );
    process_event(&state, request).instrument(span).await
}

fn validate_chat_id(chat_id: &str) -> Result<(), ApiError> {
    if chat_id.trim().is_empty() {
        return Err(bad_request_error("chat_id is required"));
    }
    Ok(())
}

async fn process_event(state: &AppState, request: EventRequest) -> ApiResult<EventResponse> {
    let EventRequest { chat_id, event } = request;

    if let Event::Voice { file_url } = &event {
        // Same per-chat guard as dialogue turns: clips of one chat share a file
        let _turn = state.flow_runner.lock(&chat_id).await;
        let reply = state.voice.handle(&chat_id, file_url).await;
        let current = current_state(state, &chat_id).await?;
        return Ok(Json(EventResponse {
            chat_id,
            state: current,
            replies: vec![reply],
        }));
    }

    match state.flow_runner.run(&chat_id, &event).await {
        Ok(result) => {
            info!(state = %result.state, replies = result.replies.len(), "turn handled");
            Ok(Json(EventResponse {
                chat_id,
                state: result.state,
                replies: result.replies,
            }))
        }
        Err(e) => {
            error!("Failed to handle event for chat {}: {}", chat_id, e);
            Err(internal_error("Failed to handle event", &e.to_string()))
        }
    }
}

async fn current_state(state: &AppState, chat_id: &str) -> Result<DialogueState, ApiError> {
    match state.flow_runner.session(chat_id).await {
        Ok(session) => Ok(session.map(|s| s.state).unwrap_or_default()),
        Err(e) => {
            error!("Failed to load session {}: {}", chat_id, e);
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn get_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> ApiResult<Session> {
    match state.flow_runner.session(&chat_id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err(not_found_error("Session not found", &chat_id)),
        Err(e) => {
            error!("Failed to load session {}: {}", chat_id, e);
            Err(internal_error("Failed to load session", &e.to_string()))
        }
    }
}

async fn reset_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("Resetting session: {}", chat_id);
    state.flow_runner.reset(&chat_id).await.map_err(|e| {
        error!("Failed to reset session {}: {}", chat_id, e);
        internal_error("Failed to reset session", &e.to_string())
    })?;
    Ok(StatusCode::NO_CONTENT)
}
