//! Error types for Tracewire.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Call errors
    #[error("RPC failed with status {code}: {message}")]
    Status { code: i32, message: String },

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Telemetry errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a status error, the shape handlers and client methods fail with.
    pub fn status(code: i32, message: impl Into<String>) -> Self {
        Error::Status {
            code,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = Error::status(14, "unavailable");
        assert_eq!(err.to_string(), "RPC failed with status 14: unavailable");
    }
}
