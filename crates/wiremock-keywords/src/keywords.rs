//! Keyword dispatch for test orchestration layers.
//!
//! A [`KeywordLibrary`] exposes every operation as a named keyword that takes
//! a JSON argument object (or a positional JSON array) and returns a JSON
//! value, so a test runner can drive WireMock without knowing any payload
//! shapes.
//!
//! ```no_run
//! use serde_json::json;
//! use wiremock_keywords::KeywordLibrary;
//!
//! let mut library = KeywordLibrary::new();
//! library.run_keyword("Create Mock Session", json!({"base_url": "http://localhost:8080"}))?;
//! library.run_keyword(
//!     "Create Default Mock Mapping",
//!     json!({"method": "GET", "url": "/api/.*", "status": 404}),
//! )?;
//! let body = library.run_keyword("Get Previous Request Body", json!(["/api/.*", "POST"]))?;
//! # Ok::<(), wiremock_keywords::Error>(())
//! ```

use crate::client::MockAdminClient;
use crate::error::{Error, Result};
use crate::mapping::DefaultMappingArgs;
use crate::matcher::{build_request_matcher, MatcherArgs};
use crate::response::{build_response, ResponseArgs};
use crate::transport::Payload;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Every keyword the library understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    CreateMockSession,
    CreateMockRequestMatcher,
    CreateMockResponse,
    CreateMockMapping,
    CreateDefaultMockMapping,
    CreateMockMappingWithData,
    GetRequests,
    GetPreviousRequest,
    GetPreviousRequestBody,
    ResetMockMappings,
    ResetRequestLog,
}

impl Keyword {
    pub const ALL: [Keyword; 11] = [
        Keyword::CreateMockSession,
        Keyword::CreateMockRequestMatcher,
        Keyword::CreateMockResponse,
        Keyword::CreateMockMapping,
        Keyword::CreateDefaultMockMapping,
        Keyword::CreateMockMappingWithData,
        Keyword::GetRequests,
        Keyword::GetPreviousRequest,
        Keyword::GetPreviousRequestBody,
        Keyword::ResetMockMappings,
        Keyword::ResetRequestLog,
    ];

    /// Display name, as a test author writes it.
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::CreateMockSession => "Create Mock Session",
            Keyword::CreateMockRequestMatcher => "Create Mock Request Matcher",
            Keyword::CreateMockResponse => "Create Mock Response",
            Keyword::CreateMockMapping => "Create Mock Mapping",
            Keyword::CreateDefaultMockMapping => "Create Default Mock Mapping",
            Keyword::CreateMockMappingWithData => "Create Mock Mapping With Data",
            Keyword::GetRequests => "Get Requests",
            Keyword::GetPreviousRequest => "Get Previous Request",
            Keyword::GetPreviousRequestBody => "Get Previous Request Body",
            Keyword::ResetMockMappings => "Reset Mock Mappings",
            Keyword::ResetRequestLog => "Reset Request Log",
        }
    }

    /// Argument names in positional order.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            Keyword::CreateMockSession => &["base_url"],
            Keyword::CreateMockRequestMatcher => &[
                "method",
                "url",
                "url_match_type",
                "query_parameters",
                "headers",
                "cookies",
                "json_body",
                "regex_matching",
            ],
            Keyword::CreateMockResponse => &[
                "status",
                "status_message",
                "headers",
                "response_type",
                "response",
                "template",
            ],
            Keyword::CreateMockMapping => &["request", "response"],
            Keyword::CreateDefaultMockMapping => &[
                "method",
                "url",
                "status",
                "status_message",
                "response_headers",
                "response_body",
                "template",
            ],
            Keyword::CreateMockMappingWithData => &["data"],
            Keyword::GetRequests
            | Keyword::GetPreviousRequest
            | Keyword::GetPreviousRequestBody => &["url", "method"],
            Keyword::ResetMockMappings | Keyword::ResetRequestLog => &[],
        }
    }

    /// The matcher and response builders are pure and run without a session.
    fn needs_session(&self) -> bool {
        !matches!(
            self,
            Keyword::CreateMockSession
                | Keyword::CreateMockRequestMatcher
                | Keyword::CreateMockResponse
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase and drop spaces and underscores, so `Reset Mock Mappings`,
/// `reset_mock_mappings` and `resetMockMappings` all name the same keyword.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Keyword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Keyword::ALL
            .into_iter()
            .find(|k| normalize(k.name()) == wanted)
            .ok_or_else(|| Error::UnknownKeyword(s.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SessionArgs {
    base_url: String,
}

/// Matcher and response are forwarded untouched, so fields this crate does
/// not model (`fixedDelayMilliseconds`, `fault`, `matchesJsonPath`...) reach
/// WireMock.
#[derive(Debug, Serialize, Deserialize)]
struct MappingArgs {
    request: Value,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct MappingDataArgs {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    url: String,
    #[serde(default)]
    method: Option<String>,
}

/// Keyword-driven front end over a [`MockAdminClient`].
///
/// The library starts without a session; every keyword that talks to the
/// server fails with [`Error::UninitializedSession`] until
/// `Create Mock Session` has run.
#[derive(Debug, Default)]
pub struct KeywordLibrary {
    client: Option<MockAdminClient>,
}

impl KeywordLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already opened session.
    pub fn with_client(client: MockAdminClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn client(&self) -> Result<&MockAdminClient> {
        self.client.as_ref().ok_or(Error::UninitializedSession)
    }

    /// Run the keyword called `name` with `args`.
    pub fn run_keyword(&mut self, name: &str, args: Value) -> Result<Value> {
        let keyword: Keyword = name.parse()?;
        self.run(keyword, args)
    }

    pub fn run(&mut self, keyword: Keyword, args: Value) -> Result<Value> {
        debug!("Running keyword '{}'", keyword);

        if keyword.needs_session() {
            self.client()?;
        }

        let args = named_args(keyword, args)?;

        match keyword {
            Keyword::CreateMockSession => {
                let SessionArgs { base_url } = parse_args(keyword, args)?;
                self.client = Some(MockAdminClient::new(&base_url)?);
                Ok(Value::Null)
            }
            Keyword::CreateMockRequestMatcher => {
                let matcher = build_request_matcher(parse_args::<MatcherArgs>(keyword, args)?)?;
                to_value(&matcher)
            }
            Keyword::CreateMockResponse => {
                let response = build_response(parse_args::<ResponseArgs>(keyword, args)?)?;
                to_value(&response)
            }
            Keyword::CreateMockMapping => {
                let mapping: MappingArgs = parse_args(keyword, args)?;
                self.client()?.register_mapping_raw(Payload::json(&mapping)?)?;
                Ok(Value::Null)
            }
            Keyword::CreateDefaultMockMapping => {
                let args = parse_args::<DefaultMappingArgs>(keyword, args)?;
                self.client()?.register_default_mapping(args)?;
                Ok(Value::Null)
            }
            Keyword::CreateMockMappingWithData => {
                let MappingDataArgs { data } = parse_args(keyword, args)?;
                let payload = match data {
                    Value::String(text) => Payload::Raw(text),
                    other => Payload::Json(other),
                };
                self.client()?.register_mapping_raw(payload)?;
                Ok(Value::Null)
            }
            Keyword::GetRequests => {
                let QueryArgs { url, method } = parse_args(keyword, args)?;
                let requests = self.client()?.find_requests(&url, method.as_deref())?;
                to_value(&requests)
            }
            Keyword::GetPreviousRequest => {
                let QueryArgs { url, method } = parse_args(keyword, args)?;
                let request = self
                    .client()?
                    .get_previous_request(&url, method.as_deref())?;
                to_value(&request)
            }
            Keyword::GetPreviousRequestBody => {
                let QueryArgs { url, method } = parse_args(keyword, args)?;
                self.client()?
                    .get_previous_request_body(&url, method.as_deref())
            }
            Keyword::ResetMockMappings => {
                self.client()?.reset_mappings()?;
                Ok(Value::Null)
            }
            Keyword::ResetRequestLog => {
                self.client()?.reset_request_log()?;
                Ok(Value::Null)
            }
        }
    }
}

/// Turn positional arguments into a named argument object. Trailing
/// positionals may be omitted; `null` means no arguments.
fn named_args(keyword: Keyword, args: Value) -> Result<Map<String, Value>> {
    let invalid = |reason: String| Error::InvalidArguments {
        keyword: keyword.name().to_string(),
        reason,
    };

    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        Value::Array(values) => {
            let names = keyword.parameters();
            if values.len() > names.len() {
                return Err(invalid(format!(
                    "takes at most {} positional arguments, got {}",
                    names.len(),
                    values.len()
                )));
            }
            Ok(names
                .iter()
                .map(|name| name.to_string())
                .zip(values)
                .collect())
        }
        other => Err(invalid(format!(
            "expected an argument object or array, got {other}"
        ))),
    }
}

fn parse_args<T: DeserializeOwned>(keyword: Keyword, args: Map<String, Value>) -> Result<T> {
    // Positional callers pass null for "not given"
    let args: Map<String, Value> = args.into_iter().filter(|(_, v)| !v.is_null()).collect();
    serde_json::from_value(Value::Object(args)).map_err(|e| Error::InvalidArguments {
        keyword: keyword.name().to_string(),
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_names_parse() {
        for keyword in Keyword::ALL {
            assert_eq!(keyword.name().parse::<Keyword>().unwrap(), keyword);
        }
        assert_eq!(
            "reset_mock_mappings".parse::<Keyword>().unwrap(),
            Keyword::ResetMockMappings
        );
        assert_eq!(
            "getPreviousRequestBody".parse::<Keyword>().unwrap(),
            Keyword::GetPreviousRequestBody
        );
        assert!(matches!(
            "Delete Everything".parse::<Keyword>(),
            Err(Error::UnknownKeyword(_))
        ));
    }

    #[test]
    fn test_network_keywords_need_session() {
        let mut library = KeywordLibrary::new();
        for keyword in [
            Keyword::CreateMockMapping,
            Keyword::CreateDefaultMockMapping,
            Keyword::CreateMockMappingWithData,
            Keyword::GetRequests,
            Keyword::GetPreviousRequest,
            Keyword::GetPreviousRequestBody,
            Keyword::ResetMockMappings,
            Keyword::ResetRequestLog,
        ] {
            assert!(
                matches!(library.run(keyword, json!({})), Err(Error::UninitializedSession)),
                "{keyword} ran without a session"
            );
        }
    }

    #[test]
    fn test_builders_work_without_session() {
        let mut library = KeywordLibrary::new();

        let matcher = library
            .run_keyword(
                "Create Mock Request Matcher",
                json!({
                    "method": "GET",
                    "url": "/api/.*",
                    "url_match_type": "urlPathPattern",
                    "headers": {"Accept": "application/.*"},
                    "regex_matching": true
                }),
            )
            .unwrap();
        assert_eq!(
            matcher,
            json!({
                "method": "GET",
                "urlPathPattern": "/api/.*",
                "headers": {"Accept": {"matches": "application/.*", "caseInsensitive": true}}
            })
        );

        let response = library
            .run_keyword("Create Mock Response", json!(["200", null, {"X-A": "b"}]))
            .unwrap();
        assert_eq!(response, json!({"status": 200, "headers": {"X-A": "b"}}));
    }

    #[test]
    fn test_create_mock_response_bad_status() {
        let mut library = KeywordLibrary::new();
        assert!(matches!(
            library.run_keyword("Create Mock Response", json!({"status": "OK"})),
            Err(Error::TypeConversion(_))
        ));
    }

    #[test]
    fn test_positional_arguments() {
        let args = named_args(Keyword::GetRequests, json!(["/api", "POST"])).unwrap();
        assert_eq!(Value::Object(args), json!({"url": "/api", "method": "POST"}));

        let args = named_args(Keyword::GetRequests, json!(["/api"])).unwrap();
        assert_eq!(Value::Object(args), json!({"url": "/api"}));

        assert!(matches!(
            named_args(Keyword::ResetMockMappings, json!(["extra"])),
            Err(Error::InvalidArguments { .. })
        ));
        assert!(matches!(
            named_args(Keyword::GetRequests, json!("/api")),
            Err(Error::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_missing_required_argument() {
        let mut library = KeywordLibrary::new();
        let err = library
            .run_keyword("Create Mock Request Matcher", json!({"method": "GET"}))
            .unwrap_err();
        match err {
            Error::InvalidArguments { keyword, reason } => {
                assert_eq!(keyword, "Create Mock Request Matcher");
                assert!(reason.contains("url"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_create_session() {
        let mut library = KeywordLibrary::new();
        assert!(library.client().is_err());
        library
            .run_keyword("Create Mock Session", json!(["http://localhost:8080"]))
            .unwrap();
        assert_eq!(library.client().unwrap().base_url(), "http://localhost:8080/");
    }
}
