//! reqwest-backed transports.
//!
//! [`TransportSettings`] turns a [`ClientConfig`] into builder settings shared
//! by the async [`HttpTransport`] (batches) and the [`BlockingTransport`]
//! (single requests). Both return the status and body of a response, or a
//! classified [`Error`].

use crate::config::{seconds_to_timeout, ClientConfig};
use crate::encode::TransportPayload;
use crate::error::{Error, ErrorContext};
use crate::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Maximum number of body characters quoted in a status failure message.
const BODY_SUMMARY_CHARS: usize = 120;

/// Transport settings resolved from a [`ClientConfig`].
///
/// Recognized `extra` keys: `connect_timeout` (seconds), `headers` (object),
/// `user_agent`, `proxy`, `allow_redirects` (bool), `max_redirects`
/// (integer) and `base_uri`. Other keys are ignored. Proxy environment
/// variables are not consulted.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub verify_tls: bool,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub headers: HeaderMap,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    /// `None` keeps reqwest's default policy; `Some(0)` disables redirects.
    pub redirect_limit: Option<usize>,
    pub base_uri: Option<Url>,
}

impl TransportSettings {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut settings = Self {
            verify_tls: config.verify_tls,
            timeout: config.timeout,
            connect_timeout: None,
            headers: HeaderMap::new(),
            user_agent: None,
            proxy: None,
            redirect_limit: None,
            base_uri: None,
        };
        let mut allow_redirects = true;

        for (key, value) in &config.extra {
            match key.as_str() {
                "connect_timeout" => {
                    let secs = value
                        .as_f64()
                        .ok_or_else(|| invalid_extra(key, "expected a number of seconds", value))?;
                    settings.connect_timeout = seconds_to_timeout(secs, "extra.connect_timeout")?;
                }
                "headers" => settings.headers = parse_headers(value)?,
                "user_agent" => {
                    let ua = value
                        .as_str()
                        .ok_or_else(|| invalid_extra(key, "expected a string", value))?;
                    settings.user_agent = Some(ua.to_string());
                }
                "proxy" => {
                    let proxy = value
                        .as_str()
                        .ok_or_else(|| invalid_extra(key, "expected a proxy URL", value))?;
                    settings.proxy = Some(proxy.to_string());
                }
                "allow_redirects" => {
                    allow_redirects = value
                        .as_bool()
                        .ok_or_else(|| invalid_extra(key, "expected a boolean", value))?;
                }
                "max_redirects" => {
                    let n = value
                        .as_u64()
                        .ok_or_else(|| invalid_extra(key, "expected a non-negative integer", value))?;
                    settings.redirect_limit = Some(n as usize);
                }
                "base_uri" => {
                    let raw = value
                        .as_str()
                        .ok_or_else(|| invalid_extra(key, "expected a URL", value))?;
                    let url = Url::parse(raw)
                        .map_err(|e| invalid_extra(key, &format!("invalid URL: {}", e), value))?;
                    settings.base_uri = Some(url);
                }
                other => debug!(key = other, "ignoring unrecognized client option"),
            }
        }

        if !allow_redirects {
            settings.redirect_limit = Some(0);
        }
        Ok(settings)
    }

    pub fn resolve_url(&self, raw: &str) -> Result<Url> {
        resolve_url(self.base_uri.as_ref(), raw)
    }
}

fn invalid_extra(key: &str, message: &str, value: &Value) -> Error {
    Error::configuration_with_context(
        message,
        ErrorContext::new()
            .with_field_path(format!("extra.{}", key))
            .with_details(value.to_string()),
    )
}

fn parse_headers(value: &Value) -> Result<HeaderMap> {
    let map = value
        .as_object()
        .ok_or_else(|| invalid_extra("headers", "expected an object", value))?;
    let mut headers = HeaderMap::new();
    for (name, raw) in map {
        let text = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(invalid_extra("headers", "header values must be scalars", raw)),
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| invalid_extra("headers", &format!("invalid header name: {}", e), raw))?;
        let value = HeaderValue::from_str(&text)
            .map_err(|e| invalid_extra("headers", &format!("invalid header value: {}", e), raw))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Parse `raw`, joining it onto `base` when it is relative.
pub fn resolve_url(base: Option<&Url>, raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base
                .join(raw)
                .map_err(|e| Error::InvalidRequest(format!("invalid URL {:?}: {}", raw, e))),
            None => Err(Error::InvalidRequest(format!(
                "relative URL {:?} without base_uri",
                raw
            ))),
        },
        Err(e) => Err(Error::InvalidRequest(format!("invalid URL {:?}: {}", raw, e))),
    }
}

/// 4xx and 5xx are failures; 1xx-3xx are delivered as responses.
pub fn is_failure_status(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Human-readable description of a failing status.
pub fn status_failure_message(method: &Method, url: &Url, status: StatusCode, body: &str) -> String {
    let class = if status.is_server_error() {
        "Server error"
    } else {
        "Client error"
    };
    let mut message = format!(
        "{}: `{} {}` resulted in a `{}` response",
        class, method, url, status
    );
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(":\n");
        if body.chars().count() > BODY_SUMMARY_CHARS {
            message.extend(body.chars().take(BODY_SUMMARY_CHARS));
            message.push_str(" (truncated...)");
        } else {
            message.push_str(body);
        }
    }
    message
}

fn into_outcome(method: &Method, url: &Url, status: StatusCode, body: String) -> Result<(u16, String)> {
    if is_failure_status(status) {
        return Err(Error::Status {
            status: status.as_u16(),
            message: status_failure_message(method, url, status, &body),
        });
    }
    Ok((status.as_u16(), body))
}

// Options shared by the async and blocking builders (identical method names,
// distinct types). Timeouts are set by the callers because their signatures differ.
macro_rules! configure_builder {
    ($builder:expr, $settings:expr) => {{
        let settings: &TransportSettings = $settings;
        let mut builder = $builder
            .danger_accept_invalid_certs(!settings.verify_tls)
            .default_headers(settings.headers.clone());
        if let Some(connect_timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(ua) = &settings.user_agent {
            builder = builder.user_agent(ua.as_str());
        }
        if let Some(proxy_url) = &settings.proxy {
            let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy",
                    ErrorContext::new()
                        .with_field_path("extra.proxy")
                        .with_details(e.to_string()),
                )
            })?;
            builder = builder.proxy(proxy);
        } else {
            // Only configuration passed in decides proxying, never the environment.
            builder = builder.no_proxy();
        }
        match settings.redirect_limit {
            Some(0) => builder = builder.redirect(Policy::none()),
            Some(n) => builder = builder.redirect(Policy::limited(n)),
            None => {}
        }
        builder
    }};
}

fn build_error(e: reqwest::Error) -> Error {
    Error::configuration_with_context(
        "failed to build HTTP client",
        ErrorContext::new().with_details(e.to_string()),
    )
}

/// Async transport used by the batch dispatcher.
pub struct HttpTransport {
    client: reqwest::Client,
    settings: TransportSettings,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let settings = TransportSettings::from_config(config)?;
        let mut builder = configure_builder!(reqwest::Client::builder(), &settings);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(build_error)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    pub fn resolve_url(&self, raw: &str) -> Result<Url> {
        self.settings.resolve_url(raw)
    }

    /// Send one request; returns `(status, body)` or the classified failure.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        payload: &TransportPayload,
    ) -> Result<(u16, String)> {
        debug!(method = %method, url = %url, payload = payload.kind(), "sending request");
        let request = payload.apply(self.client.request(method.clone(), url.clone()));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        into_outcome(&method, &url, status, body)
    }
}

/// Blocking transport used by the single-request client.
///
/// Must not be created or dropped from inside an async runtime.
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
    settings: TransportSettings,
}

impl BlockingTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let settings = TransportSettings::from_config(config)?;
        let builder = configure_builder!(reqwest::blocking::Client::builder(), &settings);
        // The blocking builder defaults to 30s; pass `None` through explicitly.
        let client = builder
            .timeout(settings.timeout)
            .build()
            .map_err(build_error)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    pub fn resolve_url(&self, raw: &str) -> Result<Url> {
        self.settings.resolve_url(raw)
    }

    pub fn execute(&self, method: Method, url: Url, payload: &TransportPayload) -> Result<(u16, String)> {
        debug!(method = %method, url = %url, payload = payload.kind(), "sending request");
        let request = payload.apply(self.client.request(method.clone(), url.clone()));
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        into_outcome(&method, &url, status, body)
    }
}
