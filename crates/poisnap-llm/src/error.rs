//! Error types for the model session layer.

use thiserror::Error;

/// Errors that can occur while loading or running a local model.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Failed to load model weights from disk.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Generation was requested before a model was loaded.
    #[error("model not loaded")]
    NotLoaded,

    /// The decode loop failed mid-generation.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The decode loop exceeded its completion deadline.
    #[error("generation deadline exceeded")]
    DeadlineExceeded,

    /// Generation was cancelled by the caller.
    #[error("generation cancelled")]
    Cancelled,

    /// I/O error when reading model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
