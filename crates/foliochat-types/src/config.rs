//! API endpoint configuration.
//!
//! The base URL comes from `FOLIOCHAT_API_URL`. Older deployments set it
//! to the full v1 path, so a trailing `/api/v1` or `/api/v2` segment is
//! stripped before the endpoint paths are appended.

/// Environment variable naming the backend base URL.
pub const API_URL_ENV: &str = "FOLIOCHAT_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Resolved endpoint configuration for both transports.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Build from an explicit base URL, normalizing any version suffix.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
        }
    }

    /// Build from `FOLIOCHAT_API_URL`, falling back to localhost.
    pub fn from_env() -> Self {
        let raw = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&raw)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Streaming chat endpoint (SSE response body).
    pub fn stream_url(&self) -> String {
        format!("{}/api/v2/chat/stream", self.base_url)
    }

    /// Single-shot fallback chat endpoint.
    pub fn sync_url(&self) -> String {
        format!("{}/api/v1/chat", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Strip a trailing `/api/v1[/...]` or `/api/v2[/...]` path from a
/// configured URL, plus any trailing slash.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for marker in ["/api/v1", "/api/v2"] {
        if let Some(pos) = trimmed.rfind(marker) {
            let rest = &trimmed[pos + marker.len()..];
            // Only strip an actual path suffix, not a lookalike host segment.
            if rest.is_empty() || rest.starts_with('/') {
                return trimmed[..pos].to_string();
            }
        }
    }
    trimmed.to_string()
}
