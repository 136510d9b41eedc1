//! Request matcher construction.
//!
//! A [`RequestMatcher`] describes which incoming requests a stub mapping
//! applies to. It serializes to the `request` object of a WireMock mapping:
//!
//! ```json
//! {
//!   "method": "GET",
//!   "urlPath": "/api/users",
//!   "queryParameters": { "page": { "equalTo": "1" } },
//!   "headers": { "Accept": { "equalTo": "application/json", "caseInsensitive": true } },
//!   "bodyPatterns": [{ "equalToJson": "{\"a\":1}", "ignoreArrayOrder": true, "ignoreExtraElements": true }]
//! }
//! ```
//!
//! Optional parts are absent from the JSON unless they were supplied.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which URL field the matcher uses, and therefore how the URL is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlMatchMode {
    /// Exact match on path and query string.
    Url,
    /// Regex match on path and query string.
    UrlPattern,
    /// Exact match on the path only.
    #[default]
    UrlPath,
    /// Regex match on the path only.
    UrlPathPattern,
}

impl UrlMatchMode {
    /// The JSON key WireMock expects for this mode.
    pub fn key(&self) -> &'static str {
        match self {
            UrlMatchMode::Url => "url",
            UrlMatchMode::UrlPattern => "urlPattern",
            UrlMatchMode::UrlPath => "urlPath",
            UrlMatchMode::UrlPathPattern => "urlPathPattern",
        }
    }

    /// Whether the query string takes part in the URL comparison.
    pub fn includes_query(&self) -> bool {
        matches!(self, UrlMatchMode::Url | UrlMatchMode::UrlPattern)
    }

    /// Whether the URL is interpreted as a regular expression.
    pub fn is_regex(&self) -> bool {
        matches!(self, UrlMatchMode::UrlPattern | UrlMatchMode::UrlPathPattern)
    }
}

impl fmt::Display for UrlMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UrlMatchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(UrlMatchMode::Url),
            "urlPattern" => Ok(UrlMatchMode::UrlPattern),
            "urlPath" => Ok(UrlMatchMode::UrlPath),
            "urlPathPattern" => Ok(UrlMatchMode::UrlPathPattern),
            other => Err(Error::InvalidArguments {
                keyword: "Create Mock Request Matcher".to_string(),
                reason: format!(
                    "unknown url_match_type '{other}' (expected url, urlPattern, urlPath or urlPathPattern)"
                ),
            }),
        }
    }
}

/// Operator applied to query parameter, header and cookie values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOperator {
    #[default]
    EqualTo,
    Matches,
}

impl MatchOperator {
    /// `Matches` when regex matching is requested, `EqualTo` otherwise.
    pub fn from_regex_flag(regex_matching: bool) -> Self {
        if regex_matching {
            MatchOperator::Matches
        } else {
            MatchOperator::EqualTo
        }
    }

    fn rule(self, value: Value) -> MatchRule {
        match self {
            MatchOperator::EqualTo => MatchRule::EqualTo(value),
            MatchOperator::Matches => MatchRule::Matches(value),
        }
    }
}

/// A single-operator comparison, serialized as `{"equalTo": ...}` or
/// `{"matches": ...}`. The operand is passed to WireMock as given, so
/// numbers and booleans stay unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRule {
    EqualTo(Value),
    Matches(Value),
}

/// A value pattern for one query parameter, header or cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePattern {
    #[serde(flatten)]
    pub rule: MatchRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
}

/// The `equalToJson` body pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPattern {
    /// Canonical JSON text of the expected body.
    pub equal_to_json: String,
    pub ignore_array_order: bool,
    pub ignore_extra_elements: bool,
}

impl BodyPattern {
    /// Serialize `body` with sorted object keys and wrap it in a lenient
    /// `equalToJson` rule.
    pub fn equal_to_json<T: Serialize + ?Sized>(body: &T) -> Result<Self> {
        // Going through Value sorts object keys, so the text is canonical.
        let value = serde_json::to_value(body).map_err(Error::Serialization)?;
        let text = serde_json::to_string(&value).map_err(Error::Serialization)?;
        Ok(Self {
            equal_to_json: text,
            ignore_array_order: true,
            ignore_extra_elements: true,
        })
    }
}

/// URL part of a matcher. Exactly one of the four keys is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UrlMatcher {
    Url(String),
    UrlPattern(String),
    UrlPath(String),
    UrlPathPattern(String),
}

impl UrlMatcher {
    pub fn new(mode: UrlMatchMode, url: impl Into<String>) -> Self {
        let url = url.into();
        match mode {
            UrlMatchMode::Url => UrlMatcher::Url(url),
            UrlMatchMode::UrlPattern => UrlMatcher::UrlPattern(url),
            UrlMatchMode::UrlPath => UrlMatcher::UrlPath(url),
            UrlMatchMode::UrlPathPattern => UrlMatcher::UrlPathPattern(url),
        }
    }

    pub fn mode(&self) -> UrlMatchMode {
        match self {
            UrlMatcher::Url(_) => UrlMatchMode::Url,
            UrlMatcher::UrlPattern(_) => UrlMatchMode::UrlPattern,
            UrlMatcher::UrlPath(_) => UrlMatchMode::UrlPath,
            UrlMatcher::UrlPathPattern(_) => UrlMatchMode::UrlPathPattern,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            UrlMatcher::Url(u)
            | UrlMatcher::UrlPattern(u)
            | UrlMatcher::UrlPath(u)
            | UrlMatcher::UrlPathPattern(u) => u,
        }
    }
}

/// The `request` half of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMatcher {
    pub method: String,
    #[serde(flatten)]
    pub url: UrlMatcher,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<BTreeMap<String, ValuePattern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, ValuePattern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<BTreeMap<String, ValuePattern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_patterns: Option<Vec<BodyPattern>>,
}

impl RequestMatcher {
    /// Start a matcher for `method` and `url`. The URL match mode defaults to
    /// [`UrlMatchMode::UrlPath`].
    pub fn builder(method: impl Into<String>, url: impl Into<String>) -> RequestMatcherBuilder {
        RequestMatcherBuilder {
            method: method.into(),
            url: url.into(),
            url_match_mode: UrlMatchMode::default(),
            query_parameters: BTreeMap::new(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            json_body: None,
            regex_matching: false,
        }
    }
}

/// Builder for [`RequestMatcher`].
///
/// The value operator is chosen once, at [`build`](Self::build) time, so it
/// applies uniformly to every query parameter, header and cookie regardless
/// of call order.
#[derive(Debug, Clone)]
pub struct RequestMatcherBuilder {
    method: String,
    url: String,
    url_match_mode: UrlMatchMode,
    query_parameters: BTreeMap<String, Value>,
    headers: BTreeMap<String, Value>,
    cookies: BTreeMap<String, Value>,
    json_body: Option<Value>,
    regex_matching: bool,
}

impl RequestMatcherBuilder {
    pub fn url_match_mode(mut self, mode: UrlMatchMode) -> Self {
        self.url_match_mode = mode;
        self
    }

    pub fn query_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_parameters.insert(name.into(), value.into());
        self
    }

    pub fn query_parameters<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.query_parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.cookies
            .extend(cookies.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Expected JSON body. Fails if `body` cannot be represented as JSON.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.json_body = Some(serde_json::to_value(body).map_err(Error::Serialization)?);
        Ok(self)
    }

    pub fn regex_matching(mut self, enabled: bool) -> Self {
        self.regex_matching = enabled;
        self
    }

    pub fn build(self) -> Result<RequestMatcher> {
        let operator = MatchOperator::from_regex_flag(self.regex_matching);

        let body_patterns = match &self.json_body {
            Some(body) => Some(vec![BodyPattern::equal_to_json(body)?]),
            None => None,
        };

        Ok(RequestMatcher {
            method: self.method,
            url: UrlMatcher::new(self.url_match_mode, self.url),
            query_parameters: patterns(self.query_parameters, operator, None),
            headers: patterns(self.headers, operator, Some(true)),
            cookies: patterns(self.cookies, operator, None),
            body_patterns,
        })
    }
}

fn patterns(
    values: BTreeMap<String, Value>,
    operator: MatchOperator,
    case_insensitive: Option<bool>,
) -> Option<BTreeMap<String, ValuePattern>> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .into_iter()
            .map(|(name, value)| {
                (
                    name,
                    ValuePattern {
                        rule: operator.rule(value),
                        case_insensitive,
                    },
                )
            })
            .collect(),
    )
}

/// Matcher arguments as they arrive from the keyword layer.
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherArgs {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub url_match_type: UrlMatchMode,
    #[serde(default)]
    pub query_parameters: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub cookies: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub json_body: Option<Value>,
    #[serde(default)]
    pub regex_matching: bool,
}

/// Build a [`RequestMatcher`] from keyword-style arguments.
pub fn build_request_matcher(args: MatcherArgs) -> Result<RequestMatcher> {
    let mut builder = RequestMatcher::builder(args.method, args.url)
        .url_match_mode(args.url_match_type)
        .query_parameters(args.query_parameters.unwrap_or_default())
        .headers(args.headers.unwrap_or_default())
        .cookies(args.cookies.unwrap_or_default())
        .regex_matching(args.regex_matching);

    if let Some(body) = &args.json_body {
        builder = builder.json_body(body)?;
    }

    builder.build()
}
