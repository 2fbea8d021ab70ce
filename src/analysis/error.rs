//! Analysis error types

use thiserror::Error;

/// Message shown when a failure carries no description of its own
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Message for a non-success HTTP status. The response body is not consulted.
pub const STATUS_FAILURE: &str = "Failed to analyze trade";

/// Analysis error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub message: String,
}

impl AnalysisError {
    /// Build an error; a blank message is replaced by [`GENERIC_FAILURE`].
    pub fn new(kind: AnalysisErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        Self { kind, message }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AnalysisErrorKind::Network, message)
    }

    pub fn status(code: u16) -> Self {
        Self::new(
            AnalysisErrorKind::Status,
            format!("{STATUS_FAILURE} (HTTP {code})"),
        )
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(AnalysisErrorKind::Shape, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(AnalysisErrorKind::Unknown, message)
    }
}

/// Where in the request a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// Service unreachable, connection dropped, timeout
    Network,
    /// Service answered with a non-2xx status
    Status,
    /// 2xx answer whose body is not a complete analysis
    Shape,
    /// Anything else, including a crashed request task
    Unknown,
}
