//! Router for the session API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::{SharedState, chatbot};

fn session_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Session {} not found", id))
}

/// Get a single session by ID
async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::SessionResponse>, ApiError> {
    let chatbot = chatbot(&state)?;
    let session = chatbot
        .session_info(&id)
        .ok_or_else(|| session_not_found(&id))?;

    Ok(Json(public::SessionResponse {
        success: true,
        session,
    }))
}

/// Reset a session's history back to the system message
async fn clear_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::SessionClearedResponse>, ApiError> {
    let chatbot = chatbot(&state)?;
    if !chatbot.clear_session(&id).await {
        return Err(session_not_found(&id));
    }

    Ok(Json(public::SessionClearedResponse {
        success: true,
        message: String::from("Session cleared"),
        session_id: id,
    }))
}

/// Remove a session entirely
async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::SessionDeletedResponse>, ApiError> {
    let chatbot = chatbot(&state)?;
    if !chatbot.delete_session(&id) {
        return Err(session_not_found(&id));
    }

    Ok(Json(public::SessionDeletedResponse {
        success: true,
        message: String::from("Session deleted"),
    }))
}

/// List all live sessions
async fn list_sessions(
    State(state): State<SharedState>,
) -> Result<Json<public::SessionsResponse>, ApiError> {
    let chatbot = chatbot(&state)?;
    let sessions = chatbot.list_sessions();

    Ok(Json(public::SessionsResponse {
        success: true,
        total: sessions.len(),
        sessions,
    }))
}

/// Create the session router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session/{id}", get(get_session).delete(delete_session))
        .route("/session/{id}/clear", delete(clear_session))
        .route("/sessions", get(list_sessions))
}
