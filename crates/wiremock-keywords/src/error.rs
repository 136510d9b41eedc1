//! Error types shared by every operation in the crate.

use thiserror::Error;

/// Errors that can occur while building payloads for, or talking to, the
/// WireMock admin API.
#[derive(Error, Debug)]
pub enum Error {
    /// A keyword that needs a session was run before `Create Mock Session`.
    #[error("No mock session; create one with `Create Mock Session` first")]
    UninitializedSession,

    /// Connection refused, DNS failure, timeout and friends. Never retried.
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The admin API answered with a status code >= 400.
    #[error("WireMock failed with {status}: {body}")]
    MockServer { status: u16, body: String },

    /// A status code argument that is not an integer HTTP status.
    #[error("Cannot convert {0} to an HTTP status code")]
    TypeConversion(String),

    /// A logged request body that is not valid JSON.
    #[error("Request body is not valid JSON: {0}")]
    BodyDecode(#[source] serde_json::Error),

    /// No logged request matched a "previous request" query.
    #[error("No request received for url pattern {url_pattern}{}", method_suffix(.method))]
    NotFound {
        url_pattern: String,
        method: Option<String>,
    },

    #[error("Failed to serialize payload: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The admin API answered successfully but the reply could not be parsed.
    #[error("Failed to parse admin API response: {0}")]
    ResponseDecode(#[source] serde_json::Error),

    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),

    #[error("Invalid arguments for keyword `{keyword}`: {reason}")]
    InvalidArguments { keyword: String, reason: String },
}

fn method_suffix(method: &Option<String>) -> String {
    match method {
        Some(m) => format!(" and method {m}"),
        None => String::new(),
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_error_keeps_body_verbatim() {
        let err = Error::MockServer {
            status: 400,
            body: r#"{"errors":[{"code":10}]}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"WireMock failed with 400: {"errors":[{"code":10}]}"#
        );
    }

    #[test]
    fn test_not_found_message_mentions_method() {
        let err = Error::NotFound {
            url_pattern: "/api.*".to_string(),
            method: Some("POST".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "No request received for url pattern /api.* and method POST"
        );

        let err = Error::NotFound {
            url_pattern: "/api.*".to_string(),
            method: None,
        };
        assert_eq!(err.to_string(), "No request received for url pattern /api.*");
    }
}
