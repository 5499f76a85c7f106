//! Decoded stream events and wire shapes.
//!
//! The stream endpoint frames its response as SSE blocks
//! (`event: <type>` / `data: <json>`). [`StreamEvent::from_wire`] maps a
//! decoded frame to the closed event enum; the payload field names are
//! matched leniently because the backend has shipped several spellings
//! over time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::Source;

/// Request body shared by the stream and sync endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub message: String,
    pub thread_id: String,
}

/// Complete response from the sync endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReply {
    pub response: String,
    pub thread_id: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub email_sent: bool,
}

/// One decoded event from the stream endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A progress announcement preceding the answer text.
    Thinking { text: String },
    /// A fragment of the answer text.
    Token { text: String },
    /// The assistant started a tool invocation (not projected).
    ToolCall { name: String },
    /// A tool finished with a result preview (not projected).
    ToolResult { preview: String },
    /// Retrieval sources backing the answer.
    Sources { sources: Vec<Source> },
    /// Whether the contact email was actually sent.
    EmailStatus { sent: bool },
    /// Terminal success; a non-empty `thread_id` renames the conversation.
    Done { thread_id: String },
    /// Terminal server-classified failure for this turn.
    Error { message: String },
    /// The server invalidated the whole conversation.
    ThreadReset { message: String },
}

/// Pull the first present string field out of a JSON object.
fn first_str(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| data.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

impl StreamEvent {
    /// Decode an SSE frame (event name + parsed JSON data) into a typed
    /// event. Unknown event names yield `None` and are skipped by the
    /// transport.
    pub fn from_wire(event: &str, data: &Value) -> Option<Self> {
        match event {
            "thinking" => Some(StreamEvent::Thinking {
                text: first_str(data, &["text", "step"]).unwrap_or_default(),
            }),
            "token" => Some(StreamEvent::Token {
                text: first_str(data, &["text", "token", "content"]).unwrap_or_default(),
            }),
            "tool_call" => Some(StreamEvent::ToolCall {
                name: first_str(data, &["tool", "name"]).unwrap_or_default(),
            }),
            "tool_result" => Some(StreamEvent::ToolResult {
                preview: first_str(data, &["preview", "result", "output"]).unwrap_or_default(),
            }),
            "sources" => {
                // Either `{"sources": [...]}` or a bare array.
                let list = data.get("sources").unwrap_or(data);
                let sources: Vec<Source> =
                    serde_json::from_value(list.clone()).unwrap_or_default();
                Some(StreamEvent::Sources { sources })
            }
            "email_status" => {
                let sent = data
                    .get("sent")
                    .or_else(|| data.get("email_sent"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Some(StreamEvent::EmailStatus { sent })
            }
            "done" => Some(StreamEvent::Done {
                thread_id: first_str(data, &["thread_id"]).unwrap_or_default(),
            }),
            "error" => Some(StreamEvent::Error {
                message: first_str(data, &["message", "detail"])
                    .unwrap_or_else(|| "An error occurred.".to_string()),
            }),
            "thread_reset" => Some(StreamEvent::ThreadReset {
                message: first_str(data, &["message"])
                    .unwrap_or_else(|| "Conversation was reset.".to_string()),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_field_fallbacks() {
        for key in ["text", "token", "content"] {
            let event = StreamEvent::from_wire("token", &json!({ key: "hi" })).unwrap();
            assert_eq!(event, StreamEvent::Token { text: "hi".to_string() });
        }
    }

    #[test]
    fn test_thinking_accepts_step() {
        let event = StreamEvent::from_wire("thinking", &json!({"step": "Searching..."})).unwrap();
        assert_eq!(
            event,
            StreamEvent::Thinking { text: "Searching...".to_string() }
        );
    }

    #[test]
    fn test_sources_wrapped_object() {
        let data = json!({"sources": [
            {"document": "resume.md", "chunk": "Rust", "relevance_score": 0.9}
        ]});
        let StreamEvent::Sources { sources } =
            StreamEvent::from_wire("sources", &data).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].document, "resume.md");
    }

    #[test]
    fn test_sources_bare_array() {
        let data = json!([
            {"document": "a.md", "chunk": "x", "relevance_score": 0.1},
            {"document": "b.md", "chunk": "y", "relevance_score": 0.2}
        ]);
        let StreamEvent::Sources { sources } =
            StreamEvent::from_wire("sources", &data).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_sources_bad_shape_defaults_empty() {
        let event = StreamEvent::from_wire("sources", &json!({"sources": "nope"})).unwrap();
        assert_eq!(event, StreamEvent::Sources { sources: vec![] });
    }

    #[test]
    fn test_email_status_fallback_and_default() {
        let event = StreamEvent::from_wire("email_status", &json!({"email_sent": true})).unwrap();
        assert_eq!(event, StreamEvent::EmailStatus { sent: true });
        let event = StreamEvent::from_wire("email_status", &json!({})).unwrap();
        assert_eq!(event, StreamEvent::EmailStatus { sent: false });
    }

    #[test]
    fn test_done_empty_means_unchanged() {
        let event = StreamEvent::from_wire("done", &json!({})).unwrap();
        assert_eq!(event, StreamEvent::Done { thread_id: String::new() });
        let event = StreamEvent::from_wire("done", &json!({"thread_id": "t2"})).unwrap();
        assert_eq!(event, StreamEvent::Done { thread_id: "t2".to_string() });
    }

    #[test]
    fn test_error_detail_fallback_and_default() {
        let event = StreamEvent::from_wire("error", &json!({"detail": "nope"})).unwrap();
        assert_eq!(event, StreamEvent::Error { message: "nope".to_string() });
        let event = StreamEvent::from_wire("error", &json!({})).unwrap();
        assert_eq!(
            event,
            StreamEvent::Error { message: "An error occurred.".to_string() }
        );
    }

    #[test]
    fn test_thread_reset_default_message() {
        let event = StreamEvent::from_wire("thread_reset", &json!({})).unwrap();
        assert_eq!(
            event,
            StreamEvent::ThreadReset { message: "Conversation was reset.".to_string() }
        );
    }

    #[test]
    fn test_unknown_event_skipped() {
        assert!(StreamEvent::from_wire("ping", &json!({})).is_none());
    }

    #[test]
    fn test_sync_reply_defaults() {
        let reply: SyncReply =
            serde_json::from_str(r#"{"response":"hi","thread_id":"t1"}"#).unwrap();
        assert!(reply.sources.is_empty());
        assert!(!reply.email_sent);
    }

    #[test]
    fn test_turn_request_body_shape() {
        let request = TurnRequest {
            message: "Hello".to_string(),
            thread_id: "t1".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"message": "Hello", "thread_id": "t1"}));
    }
}
