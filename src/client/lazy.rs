use crate::client::core::HttpClient;
use crate::config::{ClientConfig, ClientOptions};
use crate::request::RequestSpec;
use crate::Result;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

/// A single-request client created on first use.
///
/// The options passed to the first successful [`get_or_init`](Self::get_or_init)
/// (or [`http_request`](Self::http_request)) build the client; every later call
/// reuses it and ignores its own options. The holder is an ordinary value:
/// whoever owns it decides its lifetime. `new` is `const`, so a caller that
/// wants process-wide sharing can put one in a `static`.
///
/// ```rust,no_run
/// use batch_http::{LazyClient, RequestSpec};
///
/// let client = LazyClient::new();
/// let body = client.http_request(&RequestSpec::get("http://localhost/ping"), None);
/// ```
pub struct LazyClient {
    cell: OnceCell<HttpClient>,
}

impl LazyClient {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Configuration of the cached client, if it has been created.
    pub fn config(&self) -> Option<&ClientConfig> {
        self.cell.get().map(HttpClient::config)
    }

    /// Return the cached client, creating it from `options` on first use.
    ///
    /// A failed build leaves the holder empty so a later call may retry.
    pub fn get_or_init(&self, options: Option<&ClientOptions>) -> Result<&HttpClient> {
        if let Some(client) = self.cell.get() {
            if let Some(opts) = options {
                if let Ok(requested) = ClientConfig::from_options(opts) {
                    if &requested != client.config() {
                        warn!("client already initialized; ignoring differing options");
                    }
                }
            }
            return Ok(client);
        }
        self.cell.get_or_try_init(|| {
            let defaults = ClientOptions::default();
            HttpClient::from_options(options.unwrap_or(&defaults))
        })
    }

    /// Single-request entry point: response body, or `None` on any failure.
    pub fn http_request(&self, spec: &RequestSpec, options: Option<&ClientOptions>) -> Option<String> {
        match self.get_or_init(options) {
            Ok(client) => client.request(spec),
            Err(e) => {
                debug!(error = %e, "failed to build client");
                None
            }
        }
    }
}

impl Default for LazyClient {
    fn default() -> Self {
        Self::new()
    }
}
