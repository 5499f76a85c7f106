//! Pure projection of decoded events onto a message record.
//!
//! One exhaustive match, no I/O, no session-wide effects. `thread_reset`
//! is a whole-session operation owned by the controller and is a no-op
//! here; `tool_call`/`tool_result` are deliberately unprojected because
//! the backend already announces each tool via `thinking` events.

use foliochat_types::chat::ChatMessage;
use foliochat_types::event::StreamEvent;

/// Apply one decoded event to the in-progress message record.
pub fn project(message: &mut ChatMessage, event: &StreamEvent) {
    match event {
        StreamEvent::Thinking { text } => {
            message.thinking_steps.push(text.clone());
        }
        StreamEvent::Token { text } => {
            message.text.push_str(text);
        }
        StreamEvent::Sources { sources } => {
            message.sources = sources.clone();
        }
        StreamEvent::EmailStatus { sent } => {
            message.email_sent = Some(*sent);
        }
        StreamEvent::Done { .. } => {
            // Identity renaming is the controller's job.
            message.is_streaming = false;
        }
        StreamEvent::Error { message: text } => {
            message.finalize_error(text.clone());
        }
        StreamEvent::ToolCall { .. }
        | StreamEvent::ToolResult { .. }
        | StreamEvent::ThreadReset { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliochat_types::chat::Source;

    fn placeholder() -> ChatMessage {
        ChatMessage::placeholder()
    }

    #[test]
    fn test_token_appends_text() {
        let mut msg = placeholder();
        project(&mut msg, &StreamEvent::Token { text: "Hi".to_string() });
        project(&mut msg, &StreamEvent::Token { text: " there".to_string() });
        assert_eq!(msg.text, "Hi there");
        assert!(msg.is_streaming);
    }

    #[test]
    fn test_thinking_appends_step() {
        let mut msg = placeholder();
        project(&mut msg, &StreamEvent::Thinking { text: "Searching".to_string() });
        project(&mut msg, &StreamEvent::Thinking { text: "Drafting".to_string() });
        assert_eq!(msg.thinking_steps, vec!["Searching", "Drafting"]);
    }

    #[test]
    fn test_sources_replaces_list() {
        let mut msg = placeholder();
        let first = vec![Source {
            document: "a.md".to_string(),
            chunk: "x".to_string(),
            relevance_score: 0.5,
        }];
        let second = vec![Source {
            document: "b.md".to_string(),
            chunk: "y".to_string(),
            relevance_score: 0.9,
        }];
        project(&mut msg, &StreamEvent::Sources { sources: first });
        project(&mut msg, &StreamEvent::Sources { sources: second.clone() });
        assert_eq!(msg.sources, second);
    }

    #[test]
    fn test_email_status_sets_flag() {
        let mut msg = placeholder();
        assert!(msg.email_sent.is_none());
        project(&mut msg, &StreamEvent::EmailStatus { sent: true });
        assert_eq!(msg.email_sent, Some(true));
    }

    #[test]
    fn test_done_stops_streaming_only() {
        let mut msg = placeholder();
        msg.text = "answer".to_string();
        project(&mut msg, &StreamEvent::Done { thread_id: "t9".to_string() });
        assert!(!msg.is_streaming);
        assert!(!msg.is_error);
        assert_eq!(msg.text, "answer");
    }

    #[test]
    fn test_error_finalizes_record() {
        let mut msg = placeholder();
        msg.text = "partial".to_string();
        project(&mut msg, &StreamEvent::Error { message: "boom".to_string() });
        assert_eq!(msg.text, "boom");
        assert!(msg.is_error);
        assert!(!msg.is_streaming);
    }

    #[test]
    fn test_tool_events_and_reset_are_ignored() {
        let mut msg = placeholder();
        let before = msg.clone();
        project(&mut msg, &StreamEvent::ToolCall { name: "search".to_string() });
        project(&mut msg, &StreamEvent::ToolResult { preview: "3 hits".to_string() });
        project(&mut msg, &StreamEvent::ThreadReset { message: "expired".to_string() });
        assert_eq!(msg.text, before.text);
        assert_eq!(msg.thinking_steps, before.thinking_steps);
        assert_eq!(msg.is_streaming, before.is_streaming);
        assert_eq!(msg.is_error, before.is_error);
    }
}
