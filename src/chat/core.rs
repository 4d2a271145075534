use std::sync::Arc;

use anyhow::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::gateway::{AzureGateway, Completion, CompletionGateway, GenerationParams};
use super::models::{Message, Role, SessionSummary};
use super::registry::SessionRegistry;
use crate::core::AppConfig;

/// Trim a user message, returning `None` if nothing is left.
pub fn normalize_message(message: &str) -> Option<&str> {
    let message = message.trim();
    (!message.is_empty()).then_some(message)
}

/// Result of a single chat turn. Gateway errors are captured here
/// rather than returned as `Err`.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatOutcome {
    Reply {
        session_id: String,
        completion: Completion,
        timestamp: DateTime<Utc>,
    },
    Failure {
        session_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChatOutcome {
    pub fn session_id(&self) -> &str {
        match self {
            ChatOutcome::Reply { session_id, .. } | ChatOutcome::Failure { session_id, .. } => {
                session_id
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChatOutcome::Reply { .. })
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub has_search: bool,
    pub model: String,
}

/// The chat service: owns the session registry and the gateway to the
/// hosted model. Construct one per process and hand it to whatever
/// needs it.
pub struct ChatBot {
    registry: SessionRegistry,
    gateway: Arc<dyn CompletionGateway>,
}

impl ChatBot {
    pub fn new(gateway: Arc<dyn CompletionGateway>, system_message: &str) -> Self {
        Self {
            registry: SessionRegistry::new(system_message),
            gateway,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let gateway = AzureGateway::from_config(config)?;
        Ok(Self::new(Arc::new(gateway), &config.system_message))
    }

    pub fn model(&self) -> &str {
        self.gateway.model()
    }

    pub fn has_search(&self) -> bool {
        self.gateway.has_retrieval()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run one turn of the conversation in `session_id`, creating the
    /// session if needed.
    ///
    /// The user message is recorded before the model is called and
    /// stays recorded if the call fails. Turns on the same session run
    /// one at a time so each user message is immediately followed by
    /// its reply.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
        params: GenerationParams,
    ) -> ChatOutcome {
        let handle = self.registry.get_or_create(session_id);
        let _turn = handle.begin_turn().await;

        let history = handle.with(|session| {
            session.push(Message::new(Role::User, message));
            session.messages().to_vec()
        });

        match self.gateway.complete(&history, &params).await {
            Ok(completion) => {
                handle.with(|session| {
                    session.push(Message::new(Role::Assistant, &completion.text))
                });
                ChatOutcome::Reply {
                    session_id: handle.id().to_string(),
                    completion,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                tracing::error!(
                    "Completion failed for session {}: {:#}",
                    handle.id(),
                    e
                );
                ChatOutcome::Failure {
                    session_id: handle.id().to_string(),
                    error: format!("{:#}", e),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    pub fn session_info(&self, session_id: &str) -> Option<SessionSummary> {
        self.registry.get(session_id).map(|h| h.summary())
    }

    pub fn session_messages(&self, session_id: &str) -> Option<Vec<Message>> {
        self.registry
            .get(session_id)
            .map(|h| h.snapshot().messages().to_vec())
    }

    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.registry.clear(session_id).await
    }

    pub fn delete_session(&self, session_id: &str) -> bool {
        self.registry.delete(session_id)
    }

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.registry.list()
    }

    pub fn stats(&self) -> ChatStats {
        ChatStats {
            total_sessions: self.registry.len(),
            total_messages: self.registry.total_user_messages(),
            has_search: self.has_search(),
            model: self.model().to_string(),
        }
    }
}
