//! Streaming chat transport over HTTP server-sent events.

use async_stream::stream;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use foliochat_core::transport::{EventStream, StreamTransport};
use foliochat_types::config::ApiConfig;
use foliochat_types::error::{ChatError, TransportFault};
use foliochat_types::event::{StreamEvent, TurnRequest};

use crate::sse::{SseFrame, SseFrameDecoder};

/// Opens one POST exchange per turn and decodes the event-stream body
/// incrementally.
///
/// Server-classified failures (429, non-2xx, a 2xx body that is not an
/// event stream) are delivered as ordinary `error` events; only
/// network-level faults and cancellation surface as `TransportFault`.
/// The caller relies on that asymmetry to decide whether a sync
/// fallback applies.
#[derive(Debug, Clone)]
pub struct HttpStreamTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpStreamTransport {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl StreamTransport for HttpStreamTransport {
    fn open(&self, request: TurnRequest, cancel: CancellationToken) -> EventStream {
        let client = self.client.clone();
        let url = self.config.stream_url();
        Box::pin(stream! {
            let send = client.post(&url).json(&request).send();
            let response = tokio::select! {
                response = send => response,
                _ = cancel.cancelled() => {
                    yield Err(TransportFault::Cancelled);
                    return;
                }
            };
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "stream request failed to connect");
                    yield Err(TransportFault::Network(e.to_string()));
                    return;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                yield Ok(StreamEvent::Error {
                    message: ChatError::RateLimited.to_string(),
                });
                return;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = super::error_detail(&body)
                    .unwrap_or_else(|| ChatError::GENERIC.to_string());
                yield Ok(StreamEvent::Error { message });
                return;
            }
            if !is_event_stream(&response) {
                yield Ok(StreamEvent::Error {
                    message: ChatError::StreamUnsupported.to_string(),
                });
                return;
            }

            let mut body = response.bytes_stream();
            let mut decoder = SseFrameDecoder::new();
            loop {
                let chunk = tokio::select! {
                    chunk = body.next() => chunk,
                    _ = cancel.cancelled() => {
                        yield Err(TransportFault::Cancelled);
                        return;
                    }
                };
                match chunk {
                    None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "stream body read failed");
                        yield Err(TransportFault::Network(e.to_string()));
                        return;
                    }
                    Some(Ok(bytes)) => {
                        for frame in decoder.push(&bytes) {
                            if let Some(event) = decode_frame(&frame) {
                                yield Ok(event);
                            }
                        }
                    }
                }
            }
            if let Some(frame) = decoder.finish() {
                if let Some(event) = decode_frame(&frame) {
                    yield Ok(event);
                }
            }
        })
    }
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream"))
}

/// Frames whose payload is not valid JSON are skipped so decoding can
/// resynchronize on the next line.
fn decode_frame(frame: &SseFrame) -> Option<StreamEvent> {
    match serde_json::from_str(&frame.data) {
        Ok(value) => StreamEvent::from_wire(&frame.event, &value),
        Err(e) => {
            debug!(event = %frame.event, error = %e, "skipping malformed event payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_decode_frame_valid_token() {
        let event = decode_frame(&frame("token", "{\"text\":\"hi\"}"));
        assert_eq!(event, Some(StreamEvent::Token { text: "hi".to_string() }));
    }

    #[test]
    fn test_decode_frame_malformed_json_skipped() {
        assert_eq!(decode_frame(&frame("token", "{\"text\":")), None);
    }

    #[test]
    fn test_decode_frame_unknown_event_skipped() {
        assert_eq!(decode_frame(&frame("heartbeat", "{}")), None);
    }
}
