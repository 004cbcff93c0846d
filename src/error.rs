//! Error types for the SOAP gateway agent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SOAP gateway errors.
///
/// Every failure reaches the caller as a value; nothing here is fatal to the
/// process and the dispatcher keeps serving directives afterwards.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unsupported request type.")]
    UnsupportedRequest,

    #[error("The proxy has been configured with the invalid endpoint '{endpoint}'")]
    InvalidEndpointConfiguration { endpoint: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedRequest => ErrorCode::UnsupportedRequest,
            Self::InvalidEndpointConfiguration { .. } => ErrorCode::InvalidEndpoint,
            Self::Transport(_) => ErrorCode::TransportFailure,
            Self::Config(_) | Self::Io(_) => ErrorCode::Configuration,
        }
    }

    /// Build the JSON-serializable failure object for this error.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code(), self.to_string())
    }
}

/// Errors surfaced by the SOAP transport.
///
/// The gateway never inspects these; they are handed back to the caller
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed SOAP response: {0}")]
    Decode(String),
}

/// Error codes reported in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Directive kind, target type or operation name not recognized
    UnsupportedRequest,
    /// Endpoint URL could not be parsed at startup
    InvalidEndpoint,
    /// The SOAP transport reported a failure
    TransportFailure,
    /// Configuration could not be loaded
    Configuration,
}

impl ErrorCode {
    /// Get the string code for this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedRequest => "UNSUPPORTED_REQUEST",
            Self::InvalidEndpoint => "INVALID_ENDPOINT",
            Self::TransportFailure => "TRANSPORT_FAILURE",
            Self::Configuration => "CONFIGURATION",
        }
    }
}

/// Failure object handed to hosts that want a JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"ERROR"`
    pub status: String,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl ErrorEnvelope {
    /// Create a new failure envelope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: "ERROR".to_string(),
            code,
            message: message.into(),
        }
    }
}
