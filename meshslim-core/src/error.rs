//! Error types for meshslim

use std::time::Duration;
use thiserror::Error;

/// Main error type for meshslim operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization failed for profile '{profile}': {message}")]
    Serialization { profile: String, message: String },

    /// The input file could not be loaded or parsed at all.
    #[error("Failed to load input '{name}': {message}")]
    InputLoad { name: String, message: String },

    #[error("Worker did not finish within {0:?}")]
    WorkerTimeout(Duration),

    #[error("Worker channel disconnected")]
    WorkerDisconnected,

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for meshslim operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InputLoad {
            name: "chair.mslm".to_string(),
            message: "bad magic".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load input 'chair.mslm': bad magic");

        let err = Error::WorkerTimeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }
}
