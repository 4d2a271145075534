//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

// Errors

pub enum ApiError {
    /// Bad input from the client
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed,
    /// The chat service was never initialized
    Unavailable,
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::MethodNotAllowed => String::from("Method not allowed"),
            ApiError::Unavailable => String::from("Chatbot not initialized"),
            ApiError::Internal(err) => format!("Something went wrong: {}", err),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        match &self {
            // Always log unexpected errors
            ApiError::Internal(err) => tracing::error!("{:#}", err),
            _ => tracing::debug!("{}: {}", status, message),
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
                "status_code": status.as_u16(),
            })),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod health {
    pub use crate::api::routes::health::public::*;
}

pub mod session {
    pub use crate::api::routes::session::public::*;
}
