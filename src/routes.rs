//! REST endpoints — thin axum adapters over the engine.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::engine::Engine;
use crate::error::EngineError;

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Engine>,
}

/// Body of both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// POST /api/wizard/chat
///
/// Advances the qualification dialogue. Always answers 200 with a reply —
/// provider failures degrade to an apology carrying an `error_stage` marker.
async fn wizard_chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state
        .engine
        .advance_wizard(&request.session_id, &request.message)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => engine_error_response("wizard", e),
    }
}

/// POST /api/demo/chat
///
/// Advances the demo dialogue. Rejected with 409 while the session has not
/// completed qualification.
async fn demo_chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    match state
        .engine
        .advance_demo(&request.session_id, &request.message)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => engine_error_response("demo", e),
    }
}

/// GET /api/sessions/{session_id}
///
/// Returns the session snapshot, or 404 for an identifier never seen.
async fn session_status(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.engine.session_status(&session_id).await {
        Some(status) => Json(status).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "unknown session" })),
        )
            .into_response(),
    }
}

/// GET /health
async fn health() -> Response {
    Json(serde_json::json!({ "status": "ok" })).into_response()
}

fn engine_error_response(stage: &str, error: EngineError) -> Response {
    match error {
        EngineError::Provider(e) => {
            tracing::warn!(error = %e, stage, "completion provider failed");
            Json(serde_json::json!({
                "reply": "Sorry — I'm having trouble responding right now. Please try again in a moment.",
                "error_stage": stage,
            }))
            .into_response()
        }
        EngineError::DemoNotReady { session_id } => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": format!(
                    "session {session_id} has not completed qualification; finish the wizard before starting the demo"
                ),
            })),
        )
            .into_response(),
    }
}

/// Build the API router.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/wizard/chat", post(wizard_chat))
        .route("/api/demo/chat", post(demo_chat))
        .route("/api/sessions/{session_id}", get(session_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
