use crate::config::{ClientConfig, ClientOptions};
use crate::encode::parse_method;
use crate::request::RequestSpec;
use crate::transport::BlockingTransport;
use crate::Result;
use tracing::debug;

/// Blocking client for one-off requests.
///
/// Built from an explicit [`ClientConfig`] and reused for as long as its owner
/// keeps it. Uses reqwest's blocking API, so it must not be created, used or
/// dropped from inside an async runtime; use [`crate::batch::BatchDispatcher`]
/// there.
pub struct HttpClient {
    transport: BlockingTransport,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = BlockingTransport::new(&config)?;
        Ok(Self { transport, config })
    }

    /// TLS verification off, 2 second timeout.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Merge `options` over the defaults and build.
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Self::new(ClientConfig::from_options(options)?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `spec` and return the response body.
    ///
    /// 4xx/5xx responses, transport failures and unreadable bodies are errors;
    /// see [`crate::Error::failure_kind`] for the classification.
    pub fn execute(&self, spec: &RequestSpec) -> Result<String> {
        let method = parse_method(&spec.method)?;
        let url = self.transport.resolve_url(&spec.url)?;
        let payload = spec.encode();
        let (_, body) = self.transport.execute(method, url, &payload)?;
        Ok(body)
    }

    /// Like [`execute`](Self::execute), but every failure collapses to `None`.
    pub fn request(&self, spec: &RequestSpec) -> Option<String> {
        match self.execute(spec) {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(
                    method = spec.method.as_str(),
                    url = spec.url.as_str(),
                    failure = %e.failure_kind(),
                    error = %e,
                    "request failed"
                );
                None
            }
        }
    }
}
