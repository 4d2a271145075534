//! Public types for the session API
use serde::Serialize;

use crate::chat::SessionSummary;

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionSummary,
}

#[derive(Serialize)]
pub struct SessionClearedResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
}

#[derive(Serialize)]
pub struct SessionDeletedResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}
