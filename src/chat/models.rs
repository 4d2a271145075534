//! The core models for managing a stateful chat with an LLM.
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use crate::openai::Role;

/// One turn in a conversation. Never modified after creation.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Message {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<&Message> for crate::openai::Message {
    fn from(msg: &Message) -> Self {
        crate::openai::Message::new(msg.role, &msg.content)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    /// Number of user turns, not the length of the transcript
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// A single conversation thread.
///
/// The first message is always the system anchor and survives
/// `clear`. `user_message_count` always matches the number of user
/// messages in the transcript.
#[derive(Clone, Debug)]
pub struct Session {
    id: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    user_message_count: usize,
}

impl Session {
    pub fn new(id: &str, system_message: &str) -> Self {
        let anchor = Message::new(Role::System, system_message);
        let now = anchor.created_at();
        Self {
            id: id.to_string(),
            messages: vec![anchor],
            created_at: now,
            last_activity_at: now,
            user_message_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn user_message_count(&self) -> usize {
        self.user_message_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn push(&mut self, msg: Message) {
        if msg.role() == Role::User {
            self.user_message_count += 1;
        }
        self.last_activity_at = msg.created_at();
        self.messages.push(msg);
    }

    /// Drop everything but the anchor.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
        self.user_message_count = 0;
        self.last_activity_at = Utc::now();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            message_count: self.user_message_count,
            created_at: self.created_at,
            last_activity: self.last_activity_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_count(session: &Session) -> usize {
        session
            .messages()
            .iter()
            .filter(|m| m.role() == Role::User)
            .count()
    }

    #[test]
    fn test_new_session_has_anchor() {
        let session = Session::new("abc", "You are a helpful assistant.");
        assert_eq!(session.id(), "abc");
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role(), Role::System);
        assert_eq!(session.messages()[0].content(), "You are a helpful assistant.");
        assert_eq!(session.user_message_count(), 0);
        assert_eq!(session.created_at(), session.last_activity_at());
    }

    #[test]
    fn test_push_counts_user_turns_only() {
        let mut session = Session::new("abc", "system");
        session.push(Message::new(Role::User, "Hi"));
        session.push(Message::new(Role::Assistant, "Hello!"));
        session.push(Message::new(Role::User, "How are you?"));

        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.user_message_count(), 2);
        assert_eq!(session.user_message_count(), user_count(&session));
    }

    #[test]
    fn test_push_bumps_last_activity() {
        let mut session = Session::new("abc", "system");
        let before = session.last_activity_at();
        let msg = Message::new(Role::User, "Hi");
        let sent_at = msg.created_at();
        session.push(msg);
        assert!(session.last_activity_at() >= before);
        assert_eq!(session.last_activity_at(), sent_at);
    }

    #[test]
    fn test_clear_keeps_anchor() {
        let mut session = Session::new("abc", "system");
        for i in 0..5 {
            session.push(Message::new(Role::User, &format!("question {}", i)));
            session.push(Message::new(Role::Assistant, &format!("answer {}", i)));
        }
        let anchor = session.messages()[0].clone();

        session.clear();

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0], anchor);
        assert_eq!(session.user_message_count(), 0);
        assert_eq!(user_count(&session), 0);
    }

    #[test]
    fn test_summary() {
        let mut session = Session::new("abc", "system");
        session.push(Message::new(Role::User, "Hi"));
        session.push(Message::new(Role::Assistant, "Hello!"));

        let summary = session.summary();
        assert_eq!(summary.session_id, "abc");
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.created_at, session.created_at());
        assert_eq!(summary.last_activity, session.last_activity_at());
    }

    #[test]
    fn test_wire_message_conversion() {
        let msg = Message::new(Role::Assistant, "Hello!");
        let wire = crate::openai::Message::from(&msg);
        assert_eq!(
            serde_json::to_string(&wire).unwrap(),
            r#"{"role":"assistant","content":"Hello!"}"#
        );
    }
}
