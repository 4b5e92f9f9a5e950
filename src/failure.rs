//! Structured failure kinds and their integer codes.
//!
//! Every failed request, single or batched, is classified into a
//! [`FailureKind`]. Batch entries carry [`FailureKind::code`] in their `code`
//! field, so callers can tell a timeout from a refused connection from an
//! HTTP 404 by inspecting a single integer.
//!
//! | Kind      | Code     | Meaning                                   |
//! |-----------|----------|-------------------------------------------|
//! | `Status`  | 400..599 | Server answered with a client/server error |
//! | `Timeout` | -1       | Request did not finish within the timeout |
//! | `Connect` | -2       | Connection could not be established       |
//! | `Tls`     | -3       | TLS handshake or certificate failure      |
//! | `Decode`  | -4       | Response body could not be read/decoded   |
//! | `Request` | -5       | Request could not be built (method, URL)  |
//! | `Other`   | -9       | Anything else                             |
//!
//! Negative codes never collide with HTTP statuses.
//!
//! ```rust
//! use batch_http::failure::FailureKind;
//!
//! assert_eq!(FailureKind::Timeout.code(), -1);
//! assert_eq!(FailureKind::Status(404).code(), 404);
//! assert_eq!(FailureKind::from_code(-2), FailureKind::Connect);
//! ```

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Non-success HTTP status returned by the server
    Status(u16),
    /// Request timed out before the response completed
    Timeout,
    /// TCP connection (or DNS resolution) failed
    Connect,
    /// TLS handshake or certificate validation failed
    Tls,
    /// Response body could not be read or decoded
    Decode,
    /// Request could not be constructed
    Request,
    /// Error could not be classified
    Other,
}

impl FailureKind {
    /// Returns the integer code stored in batch entries.
    #[inline]
    pub fn code(&self) -> i32 {
        match self {
            Self::Status(status) => i32::from(*status),
            Self::Timeout => -1,
            Self::Connect => -2,
            Self::Tls => -3,
            Self::Decode => -4,
            Self::Request => -5,
            Self::Other => -9,
        }
    }

    /// Returns the standard name (e.g., `"timeout"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Tls => "tls",
            Self::Decode => "decode",
            Self::Request => "request",
            Self::Other => "other",
        }
    }

    /// Inverse of [`code`](Self::code). Positive codes are statuses; unknown
    /// negative codes map to `Other`.
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Timeout,
            -2 => Self::Connect,
            -3 => Self::Tls,
            -4 => Self::Decode,
            -5 => Self::Request,
            c if c > 0 && c <= i32::from(u16::MAX) => Self::Status(c as u16),
            _ => Self::Other,
        }
    }

    /// Classifies a reqwest error.
    ///
    /// rustls handshake failures surface as connect errors whose sources name
    /// the certificate or handshake problem, so those are split out of
    /// `Connect`.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status(status.as_u16());
        }
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_connect() {
            return if tls_in_sources(err) {
                Self::Tls
            } else {
                Self::Connect
            };
        }
        if err.is_decode() || err.is_body() {
            return Self::Decode;
        }
        if err.is_builder() {
            return Self::Request;
        }
        Self::Other
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "status {}", status),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Looks for a TLS failure below `err`.
///
/// The top-level message is skipped: reqwest puts the request URL there.
/// The connector reports rustls errors as `io::Error` with `InvalidData`.
fn tls_in_sources(err: &(dyn StdError + 'static)) -> bool {
    let mut current = err.source();
    while let Some(source) = current {
        if let Some(io) = source.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::InvalidData {
                return true;
            }
        }
        let text = source.to_string().to_lowercase();
        if text.contains("certificate")
            || text.contains("handshake")
            || text.contains("tls")
            || text.contains("ssl")
        {
            return true;
        }
        current = source.source();
    }
    false
}

/// Joins an error and all of its sources into one `a: b: c` line.
pub fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        // hyper and reqwest often repeat the inner message verbatim
        if parts.last().map_or(true, |last| !last.contains(&text)) {
            parts.push(text);
        }
        current = source.source();
    }
    parts.join(": ")
}
