//! Public types for the chat API
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatOutcome;

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub use_documents: bool,
    pub temperature: Option<f64>,
    pub max_tokens: Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub session_id: String,
    pub tokens_used: u64,
    // Serialized as `null` rather than omitted
    pub sources: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct ChatFailure {
    pub success: bool,
    pub error: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum ChatResponse {
    Reply(ChatReply),
    Failure(ChatFailure),
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        match outcome {
            ChatOutcome::Reply {
                session_id,
                completion,
                timestamp,
            } => ChatResponse::Reply(ChatReply {
                success: true,
                response: completion.text,
                session_id,
                tokens_used: completion.tokens_used,
                sources: completion.sources,
                timestamp,
            }),
            ChatOutcome::Failure {
                session_id,
                error,
                timestamp,
            } => ChatResponse::Failure(ChatFailure {
                success: false,
                error,
                session_id,
                timestamp,
            }),
        }
    }
}
