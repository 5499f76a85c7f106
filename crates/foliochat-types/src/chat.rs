//! Message record types for a chat session.
//!
//! A session's history is an ordered list of [`ChatMessage`] records.
//! Assistant records start as streaming placeholders and are mutated in
//! place by decoded stream events until they reach a terminal state
//! (done, error, fallback completion, or cancellation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Greeting seeded as the first record of every fresh conversation.
pub const WELCOME_TEXT: &str = "Hi! I'm the portfolio AI assistant. Ask me about \
projects, skills, or experience, or ask me to send a message!";

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A retrieval source attached to an assistant answer.
///
/// Sources have no identity of their own; order within the message is
/// the only ordering that matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub document: String,
    pub chunk: String,
    pub relevance_score: f64,
}

/// A single message record in the session history.
///
/// Once `is_streaming` transitions to false the record is frozen; only
/// a retry (which deletes and recreates it) changes it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    /// Accumulated text; append-only while streaming.
    pub text: String,
    /// Whether this record is still receiving stream events.
    pub is_streaming: bool,
    /// Whether this record finalized as an error.
    pub is_error: bool,
    /// Whether this record was completed via the sync fallback.
    pub is_fallback: bool,
    /// Retrieval sources attached by a `sources` event (often empty).
    pub sources: Vec<Source>,
    /// Tri-state email delivery flag: None until an `email_status` event.
    pub email_sent: Option<bool>,
    /// Progress announcements emitted before the answer text.
    pub thinking_steps: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: MessageRole, text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            text,
            is_streaming: false,
            is_error: false,
            is_fallback: false,
            sources: Vec::new(),
            email_sent: None,
            thinking_steps: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// A user record carrying the (already trimmed) submitted text.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text.into())
    }

    /// An empty assistant placeholder in the streaming state.
    pub fn placeholder() -> Self {
        let mut msg = Self::new(MessageRole::Assistant, String::new());
        msg.is_streaming = true;
        msg
    }

    /// The synthetic greeting record seeding a fresh conversation.
    pub fn welcome() -> Self {
        Self::new(MessageRole::Assistant, WELCOME_TEXT.to_string())
    }

    /// A non-streaming assistant notice (e.g. the server's reset message).
    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text.into())
    }

    /// Finalize this record as a terminal error, replacing its text.
    pub fn finalize_error(&mut self, message: impl Into<String>) {
        self.text = message.into();
        self.is_error = true;
        self.is_streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_user_record() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.text, "hello");
        assert!(!msg.is_streaming);
        assert!(!msg.is_error);
    }

    #[test]
    fn test_placeholder_starts_streaming_and_empty() {
        let msg = ChatMessage::placeholder();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.is_streaming);
        assert!(msg.text.is_empty());
        assert!(msg.sources.is_empty());
        assert!(msg.email_sent.is_none());
        assert!(msg.thinking_steps.is_empty());
    }

    #[test]
    fn test_welcome_record() {
        let msg = ChatMessage::welcome();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.text, WELCOME_TEXT);
        assert!(!msg.is_streaming);
    }

    #[test]
    fn test_finalize_error_replaces_text() {
        let mut msg = ChatMessage::placeholder();
        msg.text = "partial".to_string();
        msg.finalize_error("boom");
        assert_eq!(msg.text, "boom");
        assert!(msg.is_error);
        assert!(!msg.is_streaming);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_source_serde() {
        let source = Source {
            document: "resume.md".to_string(),
            chunk: "Led a team of four".to_string(),
            relevance_score: 0.87,
        };
        let json = serde_json::to_string(&source).unwrap();
        let parsed: Source = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, source);
    }
}
