//! Incremental server-sent-events framing.
//!
//! The response body arrives in arbitrary-sized chunks that do not align
//! with line or event boundaries, so the decoder keeps a carry-over byte
//! buffer and only interprets complete lines. An `event:` line sets the
//! pending event name; the next `data:` line pairs with it to form one
//! frame, after which the pending name is cleared. Everything else
//! (blank separators, comments, orphan data lines) carries no frame.

use tracing::debug;

/// One decoded `event:` + `data:` pair. The data payload is the raw
/// string after the colon; JSON interpretation happens upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Stateful line decoder fed with raw body chunks.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
    pending_event: Option<String>,
}

impl SseFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk and return every frame completed by it.
    ///
    /// A chunk may end mid-line or even mid-codepoint; undecoded bytes
    /// stay in the buffer until a line terminator arrives.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.decode_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush the trailing partial line at end of body. Servers normally
    /// terminate every event block with a newline, but a final line
    /// without one is still decoded.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned();
        self.decode_line(line.trim_end_matches('\r'))
    }

    fn decode_line(&mut self, line: &str) -> Option<SseFrame> {
        if let Some(rest) = line.strip_prefix("event:") {
            self.pending_event = Some(strip_leading_space(rest).to_string());
            None
        } else if let Some(rest) = line.strip_prefix("data:") {
            match self.pending_event.take() {
                Some(event) => Some(SseFrame {
                    event,
                    data: strip_leading_space(rest).to_string(),
                }),
                None => {
                    debug!("data line without a preceding event line, skipping");
                    None
                }
            }
        } else {
            None
        }
    }
}

// The space after the field colon is optional in the wire format.
fn strip_leading_space(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest)
}
