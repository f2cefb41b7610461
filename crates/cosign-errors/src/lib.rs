//! Error handling types for the cosign coordination service.
//!
//! Every failure the coordination core can produce is deterministic and
//! caller-correctable: there is no network or disk underneath the store, so
//! nothing here is transient and nothing is retried internally.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Core error type for coordination operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required field is missing or malformed
    #[error("validation failed:: {0}")]
    Validation(String),

    /// No proposal is stored under the sequence number
    #[error("proposal not found:: sequence number {0}")]
    NotFound(u64),

    /// Duplicate proposal for an open sequence number, or duplicate signature
    #[error("conflict:: {0}")]
    Conflict(String),

    /// Operation not allowed in the proposal's current lifecycle state
    #[error("invalid state:: {0}")]
    State(String),
}

/// Result type alias for coordination operations
pub type Result<T> = std::result::Result<T, Error>;

/// Externally observable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    State,
}

impl ErrorKind {
    /// Stable label used in responses and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "notFound",
            ErrorKind::Conflict => "conflict",
            ErrorKind::State => "state",
        }
    }

    /// Numeric code for this kind, see [`codes`]
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::Validation => codes::VALIDATION,
            ErrorKind::NotFound => codes::NOT_FOUND,
            ErrorKind::Conflict => codes::CONFLICT,
            ErrorKind::State => codes::STATE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::State(_) => ErrorKind::State,
        }
    }

    /// Numeric code, identical to the HTTP status the API answers with
    pub fn code(&self) -> u16 {
        self.kind().code()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }
}

/// Error codes. The values are the HTTP status codes of the Coordination API.
pub mod codes {
    /// Malformed or missing field
    pub const VALIDATION: u16 = 400;
    /// Unknown sequence number
    pub const NOT_FOUND: u16 = 404;
    /// Duplicate proposal or duplicate signature
    pub const CONFLICT: u16 = 409;
    /// Operation invalid for the lifecycle state
    pub const STATE: u16 = 422;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("missing field: creator");
        assert_eq!(err.to_string(), "validation failed:: missing field: creator");

        let err = Error::NotFound(7);
        assert_eq!(err.to_string(), "proposal not found:: sequence number 7");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::validation("x").code(), 400);
        assert_eq!(Error::NotFound(0).code(), 404);
        assert_eq!(Error::conflict("x").code(), 409);
        assert_eq!(Error::state("x").code(), 422);
    }

    #[test]
    fn test_kind_serializes_as_label() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"notFound\"");
        assert_eq!(ErrorKind::NotFound.as_str(), "notFound");
    }
}
