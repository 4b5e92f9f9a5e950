//! Request descriptions: single requests, batch templates and batch jobs.
//!
//! All three deserialize from the caller-facing shapes:
//!
//! - [`RequestSpec`]: `{"method", "url", "type", "data"}`
//! - [`BatchJob`]: `{"options": {"method", "url", "type"}, "sendParams": [...]}`

use crate::encode::{encode, ContentType, Params, TransportPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(rename = "data", default)]
    pub params: Params,
}

impl RequestSpec {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            content_type: ContentType::default(),
            params: Params::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn encode(&self) -> TransportPayload {
        encode(&self.method, &self.params, self.content_type)
    }
}

/// Shared method/URL/content type of every request in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTemplate {
    pub method: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
}

impl BatchTemplate {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            content_type: ContentType::default(),
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn encode(&self, params: &Params) -> TransportPayload {
        encode(&self.method, params, self.content_type)
    }

    /// The full request this template produces for `params`.
    pub fn to_spec(&self, params: Params) -> RequestSpec {
        RequestSpec {
            method: self.method.clone(),
            url: self.url.clone(),
            content_type: self.content_type,
            params,
        }
    }
}

/// A template plus the ordered parameter sets to send with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    #[serde(rename = "options")]
    pub template: BatchTemplate,
    #[serde(rename = "sendParams", default)]
    pub params_list: Vec<Params>,
}

impl BatchJob {
    pub fn new(template: BatchTemplate) -> Self {
        Self {
            template,
            params_list: Vec::new(),
        }
    }

    pub fn with_params_list(mut self, params_list: Vec<Params>) -> Self {
        self.params_list = params_list;
        self
    }

    pub fn push(&mut self, params: Params) {
        self.params_list.push(params);
    }

    pub fn len(&self) -> usize {
        self.params_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params_list.is_empty()
    }
}
