//! Request encoder: turns a flat parameter mapping into a transport payload.
//!
//! - `GET` (any case) puts every parameter into the query string.
//! - Any other method sends a JSON body when the content type is `json`,
//!   and a form-urlencoded body otherwise.
//!
//! Query and form pairs are flattened with bracket notation, so nested
//! values survive the trip: `{"a": [1, 2], "b": {"c": true}}` becomes
//! `a[0]=1&a[1]=2&b[c]=1`. `null` values are omitted and booleans are sent
//! as `1`/`0`.

use crate::error::Error;
use crate::Result;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Parameter mapping for one request.
pub type Params = Map<String, Value>;

/// Body encoding hint for non-`GET` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    Json,
    #[default]
    Form,
}

impl ContentType {
    /// Case-insensitive parse. Anything other than `json` is `Form`.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            ContentType::Json
        } else {
            ContentType::Form
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Form => "form",
        }
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(ContentType::parse).unwrap_or_default())
    }
}

/// Encoded request payload, ready to be attached to a request builder.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportPayload {
    Query(Vec<(String, String)>),
    Json(Value),
    Form(Vec<(String, String)>),
}

impl TransportPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportPayload::Query(_) => "query",
            TransportPayload::Json(_) => "json",
            TransportPayload::Form(_) => "form",
        }
    }

    /// Attach the payload to a reqwest request builder.
    pub fn apply<B: PayloadTarget>(&self, builder: B) -> B {
        match self {
            TransportPayload::Query(pairs) => builder.query_pairs(pairs),
            TransportPayload::Json(body) => builder.json_body(body),
            TransportPayload::Form(pairs) => builder.form_pairs(pairs),
        }
    }
}

/// A request builder the encoder can attach payloads to.
///
/// Implemented for both the async and the blocking reqwest builders.
pub trait PayloadTarget: Sized {
    fn query_pairs(self, pairs: &[(String, String)]) -> Self;
    fn json_body(self, body: &Value) -> Self;
    fn form_pairs(self, pairs: &[(String, String)]) -> Self;
}

impl PayloadTarget for reqwest::RequestBuilder {
    fn query_pairs(self, pairs: &[(String, String)]) -> Self {
        self.query(pairs)
    }
    fn json_body(self, body: &Value) -> Self {
        self.json(body)
    }
    fn form_pairs(self, pairs: &[(String, String)]) -> Self {
        self.form(pairs)
    }
}

impl PayloadTarget for reqwest::blocking::RequestBuilder {
    fn query_pairs(self, pairs: &[(String, String)]) -> Self {
        self.query(pairs)
    }
    fn json_body(self, body: &Value) -> Self {
        self.json(body)
    }
    fn form_pairs(self, pairs: &[(String, String)]) -> Self {
        self.form(pairs)
    }
}

/// Encode `params` for `method` according to `content_type`.
///
/// GET pairs are appended to any query string already present in the URL.
pub fn encode(method: &str, params: &Params, content_type: ContentType) -> TransportPayload {
    if method.trim().eq_ignore_ascii_case("GET") {
        return TransportPayload::Query(flatten_params(params));
    }
    match content_type {
        ContentType::Json => TransportPayload::Json(Value::Object(params.clone())),
        ContentType::Form => TransportPayload::Form(flatten_params(params)),
    }
}

/// Flatten a parameter mapping into ordered key/value pairs.
pub fn flatten_params(params: &Params) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(params.len());
    for (key, value) in params {
        flatten_value(key.clone(), value, &mut out);
    }
    out
}

fn flatten_value(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, n.to_string())),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(format!("{}[{}]", key, i), item, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_value(format!("{}[{}]", key, sub), item, out);
            }
        }
    }
}

/// Uppercase and validate an HTTP method token.
pub fn parse_method(method: &str) -> Result<Method> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(Error::InvalidRequest("empty HTTP method".to_string()));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|e| Error::InvalidRequest(format!("invalid HTTP method {:?}: {}", method, e)))
}
