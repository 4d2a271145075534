//! Router for the health and stats API

use std::sync::PoisonError;

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::{SharedState, chatbot};

/// Report whether the chat service is up. Always responds, even when
/// the service isn't initialized.
async fn health(State(state): State<SharedState>) -> Json<public::HealthResponse> {
    let chatbot = state
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .chatbot
        .clone();

    let resp = match chatbot {
        Some(chatbot) => public::HealthResponse {
            status: public::HealthStatus::Healthy,
            timestamp: Utc::now(),
            chatbot_initialized: true,
            has_search: chatbot.has_search(),
            model: Some(chatbot.model().to_string()),
        },
        None => public::HealthResponse {
            status: public::HealthStatus::Unhealthy,
            timestamp: Utc::now(),
            chatbot_initialized: false,
            has_search: false,
            model: None,
        },
    };

    Json(resp)
}

/// Aggregate counts across all sessions
async fn stats(State(state): State<SharedState>) -> Result<Json<public::StatsResponse>, ApiError> {
    let chatbot = chatbot(&state)?;

    Ok(Json(public::StatsResponse {
        success: true,
        stats: chatbot.stats(),
        timestamp: Utc::now(),
    }))
}

/// Create the health router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
}
