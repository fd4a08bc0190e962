//! Error taxonomy for the generator.
//!
//! Lifecycle errors are returned synchronously from the controller. Sink
//! errors raised while a session is ticking are logged by the loop and never
//! surface here.

use thiserror::Error;

/// Errors returned by [`GenerationController`](crate::generation::GenerationController).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("already running")]
    AlreadyRunning,

    #[error("not running")]
    NotRunning,

    #[error("sink unavailable: {0}")]
    SinkUnavailable(#[source] SinkError),

    #[error("no async runtime available to spawn the generation loop")]
    RuntimeUnavailable,
}

/// Failure reported by a [`MeasurementSink`](crate::sink::MeasurementSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// For sinks outside this crate whose backend refuses a single row
    /// while staying available (constraint violation, quota).
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
