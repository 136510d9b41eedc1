//! Mapping composition and registration.

use crate::client::MockAdminClient;
use crate::error::Result;
use crate::matcher::{RequestMatcher, UrlMatchMode};
use crate::response::{coerce_status, ResponseSpec};
use crate::transport::{Payload, MAPPINGS_PATH, MAPPINGS_RESET_PATH};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// A stub mapping: when `request` matches, WireMock answers with `response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub request: RequestMatcher,
    pub response: ResponseSpec,
}

/// Pair a matcher with a response.
pub fn build_mapping(request: RequestMatcher, response: ResponseSpec) -> Mapping {
    Mapping { request, response }
}

/// Matcher for the "any request to this path pattern" case: `url` is a regex
/// over the path only, with no query, header, cookie or body conditions.
pub fn default_matcher(
    method: impl Into<String>,
    url: impl Into<String>,
) -> Result<RequestMatcher> {
    RequestMatcher::builder(method, url)
        .url_match_mode(UrlMatchMode::UrlPathPattern)
        .build()
}

fn default_status() -> Value {
    Value::from(200)
}

/// Arguments of a default mapping: any `method` request whose path matches
/// the regex `url`, answered with the given status, headers and JSON body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultMappingArgs {
    pub method: String,
    pub url: String,
    #[serde(default = "default_status")]
    pub status: Value,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub response_headers: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub response_body: Option<Value>,
    #[serde(default)]
    pub template: bool,
}

impl DefaultMappingArgs {
    /// A `200` mapping with no message, headers or body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status: default_status(),
            status_message: None,
            response_headers: None,
            response_body: None,
            template: false,
        }
    }

    pub fn into_mapping(self) -> Result<Mapping> {
        let request = default_matcher(self.method, self.url)?;

        let mut response =
            ResponseSpec::builder(coerce_status(&self.status)?).template(self.template);
        if let Some(message) = self.status_message {
            response = response.status_message(message);
        }
        if let Some(headers) = self.response_headers {
            response = response.headers(headers);
        }
        if let Some(body) = &self.response_body {
            response = response.json_body(body)?;
        }

        Ok(build_mapping(request, response.build()))
    }
}

impl MockAdminClient {
    /// Register `request` and `response` as a new stub mapping.
    pub fn register_mapping(&self, request: RequestMatcher, response: ResponseSpec) -> Result<()> {
        let mapping = build_mapping(request, response);
        self.register_mapping_raw(Payload::json(&mapping)?)
    }

    /// Register a stub for any `args.method` request whose path matches the
    /// regex `args.url`.
    pub fn register_default_mapping(&self, args: DefaultMappingArgs) -> Result<()> {
        let mapping = args.into_mapping()?;
        self.register_mapping_raw(Payload::json(&mapping)?)
    }

    /// Send a hand-written mapping. Structured payloads are serialized, text
    /// is sent as-is and WireMock decides whether it is valid.
    pub fn register_mapping_raw(&self, data: impl Into<Payload>) -> Result<()> {
        let response = self.post(MAPPINGS_PATH, data.into())?;
        info!("Registered mapping ({})", response.status);
        Ok(())
    }

    /// Remove every stub mapping from the server.
    pub fn reset_mappings(&self) -> Result<()> {
        self.post(MAPPINGS_RESET_PATH, Payload::Empty)?;
        Ok(())
    }
}
