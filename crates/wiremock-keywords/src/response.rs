//! Response specification construction.
//!
//! A [`ResponseSpec`] is the `response` half of a mapping: the status,
//! headers and body WireMock returns when the matcher fires.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name of WireMock's response templating transformer.
pub const RESPONSE_TEMPLATE_TRANSFORMER: &str = "response-template";

/// Body of a stubbed response. At most one body field is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseBody {
    /// Plain text body.
    Body(String),
    /// Base64-encoded binary body.
    Base64Body(String),
    /// Structured JSON body, kept as JSON (not stringified).
    JsonBody(Value),
    /// File under WireMock's `__files` directory.
    BodyFileName(String),
}

impl ResponseBody {
    /// Build a body from the WireMock field name and its value.
    pub fn from_type(response_type: &str, value: Value) -> Result<Self> {
        let as_text = |value: Value| match value {
            Value::String(s) => Ok(s),
            other => Err(Error::InvalidArguments {
                keyword: "Create Mock Response".to_string(),
                reason: format!("response of type {response_type} must be a string, got {other}"),
            }),
        };

        match response_type {
            "body" => Ok(ResponseBody::Body(as_text(value)?)),
            "base64Body" => Ok(ResponseBody::Base64Body(as_text(value)?)),
            "jsonBody" => Ok(ResponseBody::JsonBody(value)),
            "bodyFileName" => Ok(ResponseBody::BodyFileName(as_text(value)?)),
            other => Err(Error::InvalidArguments {
                keyword: "Create Mock Response".to_string(),
                reason: format!(
                    "unknown response_type '{other}' (expected body, base64Body, jsonBody or bodyFileName)"
                ),
            }),
        }
    }
}

/// The `response` half of a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Header values are kept as given; an array sends the header once per
    /// element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    pub body: Option<ResponseBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformers: Option<Vec<String>>,
}

impl ResponseSpec {
    pub fn builder(status: u16) -> ResponseSpecBuilder {
        ResponseSpecBuilder {
            spec: ResponseSpec {
                status,
                status_message: None,
                headers: None,
                body: None,
                transformers: None,
            },
        }
    }

    /// Whether the response opts into WireMock's templating.
    pub fn is_templated(&self) -> bool {
        self.transformers
            .as_ref()
            .is_some_and(|t| t.iter().any(|name| name == RESPONSE_TEMPLATE_TRANSFORMER))
    }
}

/// Builder for [`ResponseSpec`].
#[derive(Debug, Clone)]
pub struct ResponseSpecBuilder {
    spec: ResponseSpec,
}

impl ResponseSpecBuilder {
    pub fn status_message(mut self, message: impl Into<String>) -> Self {
        self.spec.status_message = Some(message.into());
        self
    }

    /// Replace the header map. An empty map is emitted as `{}`.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.spec.headers = Some(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec
            .headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: ResponseBody) -> Self {
        self.spec.body = Some(body);
        self
    }

    /// Structured JSON body, stored verbatim under `jsonBody`.
    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(Error::Serialization)?;
        Ok(self.body(ResponseBody::JsonBody(value)))
    }

    pub fn template(mut self, enabled: bool) -> Self {
        self.spec.transformers = if enabled {
            Some(vec![RESPONSE_TEMPLATE_TRANSFORMER.to_string()])
        } else {
            None
        };
        self
    }

    pub fn build(self) -> ResponseSpec {
        self.spec
    }
}

/// Coerce a loosely typed status argument to an HTTP status code.
///
/// Accepts JSON integers, integral floats and numeric strings.
pub fn coerce_status(value: &Value) -> Result<u16> {
    let invalid = || Error::TypeConversion(value.to_string());

    let number = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= 0.0 => f as u64,
                _ => return Err(invalid()),
            },
        },
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    u16::try_from(number).map_err(|_| invalid())
}

/// Response arguments as they arrive from the keyword layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseArgs {
    pub status: Value,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, Value>>,
    /// One of `body`, `base64Body`, `jsonBody`, `bodyFileName`.
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub response: Option<Value>,
    /// Shorthand for `response_type = jsonBody`.
    #[serde(default)]
    pub json_body: Option<Value>,
    #[serde(default)]
    pub template: bool,
}

/// Build a [`ResponseSpec`] from keyword-style arguments.
pub fn build_response(args: ResponseArgs) -> Result<ResponseSpec> {
    let mut builder = ResponseSpec::builder(coerce_status(&args.status)?).template(args.template);

    if let Some(message) = args.status_message {
        builder = builder.status_message(message);
    }
    if let Some(headers) = args.headers {
        builder = builder.headers(headers);
    }
    if let Some(response_type) = args.response_type {
        let value = args.response.unwrap_or(Value::Null);
        builder = builder.body(ResponseBody::from_type(&response_type, value)?);
    } else if let Some(body) = args.json_body {
        builder = builder.body(ResponseBody::JsonBody(body));
    }

    Ok(builder.build())
}
