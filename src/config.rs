//! Client configuration: defaults, partial overrides and loading.
//!
//! [`ClientConfig`] is the fully resolved transport configuration shared by
//! every request issued through one client. [`ClientOptions`] is the partial,
//! caller-facing form (`{verify, timeout, ...extra}`) that is merged over the
//! defaults.
//!
//! Single-request defaults are permissive: TLS certificate verification is
//! **disabled** and the timeout is **2 seconds**. Batch clients start from
//! [`ClientConfig::transport_defaults`] instead (verification on, no
//! timeout), so only the caller's own options shape them.
//!
//! ```rust
//! use batch_http::config::{ClientConfig, ClientOptions};
//! use std::time::Duration;
//!
//! let opts = ClientOptions::new().with_verify(true).with_timeout(10.0);
//! let config = ClientConfig::from_options(&opts).unwrap();
//! assert!(config.verify_tls);
//! assert_eq!(config.timeout, Some(Duration::from_secs(10)));
//! ```

use crate::error::{Error, ErrorContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default TLS certificate verification.
pub const DEFAULT_VERIFY_TLS: bool = false;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Verify server certificates.
    pub verify_tls: bool,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Additional transport settings, see [`crate::transport::TransportSettings`].
    pub extra: Map<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_tls: DEFAULT_VERIFY_TLS,
            timeout: Some(DEFAULT_TIMEOUT),
            extra: Map::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Plain transport defaults: certificates verified, no timeout.
    pub fn transport_defaults() -> Self {
        Self {
            verify_tls: true,
            timeout: None,
            extra: Map::new(),
        }
    }

    /// Merge `options` over the defaults. Keys present in `options` win.
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Self::default().merge(options)
    }

    /// Merge `options` over this configuration.
    pub fn merge(mut self, options: &ClientOptions) -> Result<Self> {
        if let Some(verify) = options.verify {
            self.verify_tls = verify;
        }
        if let Some(secs) = options.timeout {
            self.timeout = seconds_to_timeout(secs, "timeout")?;
        }
        for (key, value) in &options.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        Ok(self)
    }
}

/// Converts a seconds value into a timeout. Zero means "no timeout".
pub(crate) fn seconds_to_timeout(secs: f64, field: &str) -> Result<Option<Duration>> {
    if secs == 0.0 {
        return Ok(None);
    }
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::configuration_with_context(
            "timeout must be a finite, non-negative number of seconds",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(secs.to_string()),
        ));
    }
    Duration::try_from_secs_f64(secs).map(Some).map_err(|e| {
        Error::configuration_with_context(
            "timeout out of range",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(e.to_string()),
        )
    })
}

/// Partial client options as supplied by callers.
///
/// Unrecognized keys are collected into `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    /// Timeout in seconds; fractions allowed, `0` disables the timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }
}
