//! reqwest-backed transports built from a [`crate::config::ClientConfig`].

mod http;

pub use http::{
    is_failure_status, resolve_url, status_failure_message, BlockingTransport, HttpTransport,
    TransportSettings,
};
