//! Non-streaming chat transport, used as the one-shot fallback.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::warn;

use foliochat_core::transport::SyncTransport;
use foliochat_types::config::ApiConfig;
use foliochat_types::error::ChatError;
use foliochat_types::event::{SyncReply, TurnRequest};

/// Bound on the whole request, matching the turn safety timer.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpSyncTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpSyncTransport {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

impl SyncTransport for HttpSyncTransport {
    async fn send(&self, request: TurnRequest) -> Result<SyncReply, ChatError> {
        let response = self
            .client
            .post(self.config.sync_url())
            .json(&request)
            .timeout(SYNC_TIMEOUT)
            .send()
            .await
            .map_err(classify_request_error)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ChatError::RateLimited),
            StatusCode::INTERNAL_SERVER_ERROR => {
                let body = response.text().await.unwrap_or_default();
                match super::error_detail(&body) {
                    Some(detail) => Err(ChatError::Server(detail)),
                    None => Err(ChatError::generic()),
                }
            }
            status if !status.is_success() => {
                warn!(%status, "sync request failed");
                Err(ChatError::generic())
            }
            _ => response.json().await.map_err(|e| {
                warn!(error = %e, "sync response body was not a valid reply");
                ChatError::generic()
            }),
        }
    }
}

fn classify_request_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else if e.is_connect() {
        ChatError::Unreachable
    } else {
        warn!(error = %e, "sync request failed before a response arrived");
        ChatError::generic()
    }
}
