use crate::failure::{error_chain_message, FailureKind};
use thiserror::Error;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "extra.proxy", "timeout")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the helper layer.
///
/// Every variant maps onto a [`FailureKind`] so batch entries and the
/// single-request path classify failures the same way.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered with a 4xx/5xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Network transport error ({kind}): {}", error_chain_message(.source))]
    Transport {
        kind: FailureKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Transport {
            kind: FailureKind::from_reqwest(&source),
            source,
        }
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error pointing at a specific key.
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::Runtime(msg.into())
    }

    /// Structured failure category of this error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Status { status, .. } => FailureKind::Status(*status),
            Error::Transport { kind, .. } => *kind,
            Error::Configuration { .. } | Error::InvalidRequest(_) => FailureKind::Request,
            Error::Serialization(_) => FailureKind::Decode,
            Error::Runtime(_) | Error::Yaml(_) => FailureKind::Other,
        }
    }

    /// Integer code used in batch entries (HTTP status or negative failure code).
    pub fn code(&self) -> i32 {
        self.failure_kind().code()
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
