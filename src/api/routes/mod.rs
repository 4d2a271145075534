//! API routes module

pub mod chat;
pub mod health;
pub mod session;

use axum::Router;
use axum::extract::OriginalUri;

use crate::api::public::ApiError;
use crate::api::state::SharedState;

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Endpoint {} not found", uri.path()))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat routes
        .merge(chat::router())
        // Session routes
        .merge(session::router())
        // Health and stats routes
        .merge(health::router())
        // Everything under the API prefix answers with JSON, including
        // misses
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}
