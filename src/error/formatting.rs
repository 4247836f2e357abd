//! Error formatting utilities
//!
//! Human-readable and structured renderings of [`Error`] for the CLI and
//! for log records.

use crate::Error;
use std::error::Error as StdError;

/// Format error for display
///
/// Appends nested causes that the top-level message does not already
/// contain.
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::PreconditionNotMet {
            precondition,
            message,
        } => format!("{} (missing: {})", message, precondition),

        Error::InvalidCredential { reason } => {
            format!("ascendon token is not a valid JWT: {}", reason)
        }

        Error::Upstream {
            operation,
            status,
            body,
        } => {
            if body.is_empty() {
                format!("Failed to {} (Status Code {})", operation, status)
            } else {
                format!("Failed to {} (Status Code {}): {}", operation, status, body)
            }
        }

        // For everything else, use the Display implementation
        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "retryable": error.is_retryable(),
    });

    match error {
        Error::Upstream {
            operation, status, ..
        } => {
            log_data["operation"] = serde_json::Value::String(operation.clone());
            log_data["status"] = serde_json::Value::Number((*status).into());
        }
        Error::PreconditionNotMet { precondition, .. } => {
            log_data["precondition"] = serde_json::Value::String(precondition.clone());
        }
        _ => {}
    }

    log_data
}
