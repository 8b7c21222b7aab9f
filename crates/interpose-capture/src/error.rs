//! Error types for capture.

use std::io;
use std::path::PathBuf;

/// Errors raised while queueing or persisting captures.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The queue is at capacity.
    #[error("capture queue is full")]
    QueueFull,

    /// The sink is not running.
    #[error("capture sink is shut down")]
    ShutDown,

    /// Serializing the captured bag failed.
    #[error("failed to serialize capture: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the capture failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker runtime could not be created.
    #[error("failed to start capture worker: {0}")]
    Worker(#[source] io::Error),
}

impl CaptureError {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureError::QueueFull => "queue_full",
            CaptureError::ShutDown => "shut_down",
            CaptureError::Serialize(_) => "serialize",
            CaptureError::Io { .. } => "io",
            CaptureError::Worker(_) => "worker",
        }
    }
}

/// Result type for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;
