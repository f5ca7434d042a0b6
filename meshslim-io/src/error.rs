//! Error types for container encoding and decoding

use thiserror::Error;

/// Errors raised while reading or writing the binary container
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Unsupported container version {0}")]
    UnsupportedVersion(u16),

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        CodecError::ParseError {
            message: message.into(),
        }
    }

    pub fn write<S: Into<String>>(message: S) -> Self {
        CodecError::WriteError {
            message: message.into(),
        }
    }
}

impl From<CodecError> for meshslim_core::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => meshslim_core::Error::Io(e),
            CodecError::InvalidFormat { format } => meshslim_core::Error::UnsupportedFormat(format),
            other => meshslim_core::Error::InvalidData(other.to_string()),
        }
    }
}
