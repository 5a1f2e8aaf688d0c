//! Error types for buildchain.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors, raised while a plan is being assembled.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("duplicate definition: {0}")]
    Duplicate(String),

    #[error("payload cannot be rendered as {format}: {reason}")]
    UnsupportedPayload { format: String, reason: String },
}

impl Error {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while a target produces its outputs.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    Payload(String),
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Failures while emitting a serialized pipeline document.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("failed to emit pipeline document: {0}")]
    Io(#[from] std::io::Error),
}
