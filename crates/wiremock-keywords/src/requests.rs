//! Queries against WireMock's request journal.

use crate::client::MockAdminClient;
use crate::error::{Error, Result};
use crate::transport::{Payload, REQUESTS_FIND_PATH, REQUESTS_RESET_PATH};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request WireMock received and logged.
///
/// Only `body` is interpreted; everything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Body text as received, usually JSON-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl LoggedRequest {
    /// Decode the body as JSON. A missing body is not valid JSON.
    pub fn body_json(&self) -> Result<Value> {
        serde_json::from_str(self.body.as_deref().unwrap_or_default()).map_err(Error::BodyDecode)
    }
}

/// Body of a `/__admin/requests/find` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery<'a> {
    pub url_path_pattern: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FindRequestsResponse {
    requests: Vec<LoggedRequest>,
}

impl MockAdminClient {
    /// All logged requests whose path matches the regex `url_pattern`, in the
    /// order the server returns them.
    pub fn find_requests(
        &self,
        url_pattern: &str,
        method: Option<&str>,
    ) -> Result<Vec<LoggedRequest>> {
        let query = RequestQuery {
            url_path_pattern: url_pattern,
            method,
        };
        let response = self.post(REQUESTS_FIND_PATH, Payload::json(&query)?)?;
        let found: FindRequestsResponse = response.json()?;
        Ok(found.requests)
    }

    /// The most recent logged request matching `url_pattern`.
    pub fn get_previous_request(
        &self,
        url_pattern: &str,
        method: Option<&str>,
    ) -> Result<LoggedRequest> {
        self.find_requests(url_pattern, method)?
            .pop()
            .ok_or_else(|| Error::NotFound {
                url_pattern: url_pattern.to_string(),
                method: method.map(str::to_string),
            })
    }

    /// JSON-decoded body of the most recent logged request matching
    /// `url_pattern`.
    pub fn get_previous_request_body(
        &self,
        url_pattern: &str,
        method: Option<&str>,
    ) -> Result<Value> {
        self.get_previous_request(url_pattern, method)?.body_json()
    }

    /// Clear the request journal.
    pub fn reset_request_log(&self) -> Result<()> {
        self.post(REQUESTS_RESET_PATH, Payload::Empty)?;
        Ok(())
    }
}
