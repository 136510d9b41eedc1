//! Keyword-style client for the WireMock admin API.
//!
//! This crate turns test-author intent ("mock this endpoint", "what did the
//! last request look like") into calls against a running WireMock server. It
//! can be used directly through [`MockAdminClient`] or through the
//! name-based [`KeywordLibrary`] from a test orchestration layer.
//!
//! # Example
//!
//! ```no_run
//! use wiremock_keywords::{MockAdminClient, RequestMatcher, ResponseSpec, UrlMatchMode};
//! use serde_json::json;
//!
//! let client = MockAdminClient::new("http://localhost:8080")?;
//! client.reset_mappings()?;
//!
//! let request = RequestMatcher::builder("POST", "/api/users")
//!     .url_match_mode(UrlMatchMode::UrlPath)
//!     .header("Content-Type", "application/json")
//!     .json_body(&json!({"name": "ada"}))?
//!     .build()?;
//! let response = ResponseSpec::builder(201)
//!     .json_body(&json!({"id": 1}))?
//!     .build();
//! client.register_mapping(request, response)?;
//!
//! // ... exercise the system under test ...
//!
//! let body = client.get_previous_request_body("/api/users", Some("POST"))?;
//! assert_eq!(body["name"], "ada");
//! # Ok::<(), wiremock_keywords::Error>(())
//! ```

pub mod client;
pub mod error;
pub mod keywords;
pub mod mapping;
pub mod matcher;
pub mod requests;
pub mod response;
pub mod transport;

// Re-export public types
pub use client::MockAdminClient;
pub use error::{Error, Result};
pub use keywords::{Keyword, KeywordLibrary};
pub use mapping::{build_mapping, DefaultMappingArgs, Mapping};
pub use matcher::{build_request_matcher, MatchOperator, RequestMatcher, UrlMatchMode};
pub use requests::LoggedRequest;
pub use response::{build_response, ResponseBody, ResponseSpec};
pub use transport::{ClientConfig, Payload, DEFAULT_TIMEOUT};
