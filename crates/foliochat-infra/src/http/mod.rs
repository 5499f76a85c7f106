//! reqwest-backed implementations of the chat transports.

pub mod stream;
pub mod sync;

pub use stream::HttpStreamTransport;
pub use sync::HttpSyncTransport;

/// Pull the `detail` field out of a structured error body, if any.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_from_structured_body() {
        assert_eq!(
            error_detail("{\"detail\":\"model overloaded\"}"),
            Some("model overloaded".to_string())
        );
    }

    #[test]
    fn test_error_detail_absent_or_unparseable() {
        assert_eq!(error_detail("{\"error\":\"nope\"}"), None);
        assert_eq!(error_detail("<html>502</html>"), None);
        assert_eq!(error_detail("{\"detail\":7}"), None);
    }
}
