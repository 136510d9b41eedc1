//! Blocking HTTP transport for the WireMock admin API.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Every admin call is bounded by this timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Register a stub mapping.
pub const MAPPINGS_PATH: &str = "/__admin/mappings";
/// Remove all stub mappings.
pub const MAPPINGS_RESET_PATH: &str = "/__admin/mappings/reset";
/// Search the request journal.
pub const REQUESTS_FIND_PATH: &str = "/__admin/requests/find";
/// Clear the request journal.
pub const REQUESTS_RESET_PATH: &str = "/__admin/requests/reset";

/// Connection settings for an admin client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute URL of the WireMock server, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Body of an admin request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body at all.
    Empty,
    /// Structured JSON, serialized on send.
    Json(Value),
    /// Already serialized text, sent unchanged.
    Raw(String),
}

impl Payload {
    /// Convert any serializable value into a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(Error::Serialization)
    }

    fn into_body(self) -> Result<Option<String>> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Json(value) => serde_json::to_string(&value)
                .map(Some)
                .map_err(Error::Serialization),
            Payload::Raw(text) => Ok(Some(text)),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Raw(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Raw(text.to_string())
    }
}

/// Status and body text of a successful admin reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResponse {
    pub status: u16,
    pub body: String,
}

impl AdminResponse {
    /// Parse the reply body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::ResponseDecode)
    }
}

/// A reusable HTTP session bound to one WireMock server.
///
/// The underlying client keeps connections alive between calls. Cloning the
/// transport shares that connection pool.
#[derive(Debug, Clone)]
pub struct AdminTransport {
    client: Client,
    base_url: Url,
}

impl AdminTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL with standard URL-join rules: an
    /// absolute path replaces the base URL's path.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// POST `payload` to `path`.
    ///
    /// Replies with status >= 400 become [`Error::MockServer`] carrying the
    /// reply body verbatim; network failures become [`Error::Transport`].
    pub fn post(&self, path: &str, payload: Payload) -> Result<AdminResponse> {
        let url = self.resolve(path)?;
        let body = payload.into_body()?;

        debug!(
            "url: {}, data: {}",
            url,
            body.as_deref().unwrap_or("<none>")
        );

        let mut request = self.client.post(url.clone());
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let transport_error = |source: reqwest::Error| Error::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;

        debug!("{} answered {}", url, status);

        if status >= 400 {
            return Err(Error::MockServer { status, body });
        }

        Ok(AdminResponse { status, body })
    }
}
