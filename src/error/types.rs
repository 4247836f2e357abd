//! Error classification for the F1TV client
//!
//! Covers the session-level failure kinds (malformed credential, missing
//! precondition, upstream rejection, empty result) alongside the ambient
//! transport, decoding and configuration failures.

use thiserror::Error;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JWT library errors raised while verifying a credential signature
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The subscription token is not a structurally valid signed token
    #[error("Invalid ascendon token: {reason}")]
    InvalidCredential {
        /// What made the token unusable
        reason: String,
    },

    /// Required session state is absent for the requested operation
    #[error("Precondition not met ({precondition}): {message}")]
    PreconditionNotMet {
        /// Name of the missing piece of state
        precondition: String,
        /// Human-readable description
        message: String,
    },

    /// The service answered with a non-success HTTP status
    #[error("Failed to {operation} (Status Code {status}): {body}")]
    Upstream {
        /// The operation that was attempted
        operation: String,
        /// HTTP status code returned by the service
        status: u16,
        /// Raw response body text
        body: String,
    },

    /// The service returned zero items where one was required
    #[error("No {what} found")]
    EmptyResult {
        /// The kind of item that was expected
        what: String,
    },

    /// Signature/claims verification against the signing keys failed
    #[error("Token verification failed: {reason}")]
    Verification {
        /// The reason verification was rejected
        reason: String,
    },

    /// Transport-level failure reported by a custom transport
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the transport issue
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid credential error
    pub fn invalid_credential<S: Into<String>>(reason: S) -> Self {
        Self::InvalidCredential {
            reason: reason.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition<S: Into<String>>(precondition: S, message: S) -> Self {
        Self::PreconditionNotMet {
            precondition: precondition.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error from a failed response
    pub fn upstream<S: Into<String>>(operation: S, status: u16, body: S) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an empty result error
    pub fn empty_result<S: Into<String>>(what: S) -> Self {
        Self::EmptyResult { what: what.into() }
    }

    /// Create a verification error
    pub fn verification<S: Into<String>>(reason: S) -> Self {
        Self::Verification {
            reason: reason.into(),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by an upstream error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    ///
    /// Informational only, the client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(..) => "http",
            Error::Json(..) => "json",
            Error::Toml(..) => "toml",
            Error::Url(..) => "url",
            Error::Io(..) => "io",
            Error::Jwt(..) => "jwt",
            Error::InvalidCredential { .. } => "invalid_credential",
            Error::PreconditionNotMet { .. } => "precondition",
            Error::Upstream { .. } => "upstream",
            Error::EmptyResult { .. } => "empty_result",
            Error::Verification { .. } => "verification",
            Error::Transport { .. } => "transport",
            Error::Config { .. } => "config",
        }
    }
}
