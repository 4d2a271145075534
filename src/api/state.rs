use std::sync::{Arc, PoisonError, RwLock};

use crate::api::public::ApiError;
use crate::chat::ChatBot;

pub struct AppState {
    // `None` until the chat service has been initialized
    pub chatbot: Option<Arc<ChatBot>>,
    // Directory the chat UI is served from
    pub ui_path: String,
}

impl AppState {
    pub fn new(chatbot: ChatBot, ui_path: &str) -> Self {
        Self {
            chatbot: Some(Arc::new(chatbot)),
            ui_path: ui_path.to_string(),
        }
    }

    pub fn uninitialized(ui_path: &str) -> Self {
        Self {
            chatbot: None,
            ui_path: ui_path.to_string(),
        }
    }
}

pub type SharedState = Arc<RwLock<AppState>>;

/// Get a handle to the chat service or fail with a 503. The state lock
/// is released before returning.
pub fn chatbot(state: &SharedState) -> Result<Arc<ChatBot>, ApiError> {
    state
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .chatbot
        .clone()
        .ok_or(ApiError::Unavailable)
}
