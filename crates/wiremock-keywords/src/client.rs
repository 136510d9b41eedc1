//! The explicit client handle for one WireMock server.
//!
//! Mapping registration lives in [`crate::mapping`] and request journal
//! queries in [`crate::requests`]; both are `impl MockAdminClient` blocks.

use crate::error::Result;
use crate::transport::{AdminResponse, AdminTransport, ClientConfig, Payload};
use tracing::debug;

/// Crate version, logged when a session is opened.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A session towards one WireMock server.
///
/// Each handle owns its own HTTP session, so independent handles can be used
/// from different threads. A single handle does no internal locking beyond
/// what the HTTP client itself provides.
#[derive(Debug, Clone)]
pub struct MockAdminClient {
    transport: AdminTransport,
}

impl MockAdminClient {
    /// Open a session towards `base_url` with the default 5 second timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(&ClientConfig::new(base_url))
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        debug!("wiremock-keywords library version: {}", VERSION);
        let transport = AdminTransport::new(config)?;
        debug!("Mock session created for {}", transport.base_url());
        Ok(Self { transport })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url().as_str()
    }

    pub fn transport(&self) -> &AdminTransport {
        &self.transport
    }

    pub(crate) fn post(&self, path: &str, payload: Payload) -> Result<AdminResponse> {
        self.transport.post(path, payload)
    }
}
