//! Router for the chat API

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::{SharedState, chatbot};
use crate::chat::{GenerationParams, normalize_message};

/// Run a single chat turn and respond with the model's reply.
///
/// Remote failures are reported in the body with `success: false`
/// and still respond with a 200.
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<public::ChatRequest>, JsonRejection>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let chatbot = chatbot(&state)?;

    let Json(payload) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let message = payload
        .message
        .ok_or_else(|| ApiError::BadRequest(String::from("Message not provided")))?;
    let message = normalize_message(&message)
        .ok_or_else(|| ApiError::BadRequest(String::from("Message is empty")))?;

    let params =
        GenerationParams::resolve(payload.temperature, payload.max_tokens, payload.use_documents);

    let outcome = chatbot
        .chat(message, payload.session_id.as_deref(), params)
        .await;

    Ok(Json(outcome.into()))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/chat", post(chat_handler))
}
