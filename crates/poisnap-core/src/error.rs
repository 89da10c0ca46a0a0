//! Error types for the poisnap-core library.

use thiserror::Error;

/// Main error type for the poisnap library.
#[derive(Error, Debug)]
pub enum PoisnapError {
    /// A backend call failed with a typed backend error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Error from the model session layer.
    #[error("model error: {0}")]
    Llm(#[from] poisnap_llm::LlmError),

    /// No extraction source could be attempted for the requested policy.
    #[error("extraction not available: {0}")]
    NotAvailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Typed failures reported by extractor backends.
///
/// Parse trouble never crosses this boundary: a backend that receives a
/// reply it cannot decode degrades to a low-confidence candidate instead
/// of failing.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend cannot run at all (missing credentials, daemon down,
    /// model files absent). Not retried; the orchestrator moves on.
    #[error("backend unavailable")]
    Unavailable,

    /// The model is not loaded and loading it failed.
    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    /// The extraction attempt itself failed (network, decode, timeout).
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The transport returned a payload of the wrong shape entirely.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The caller cancelled the in-flight call.
    #[error("extraction cancelled")]
    Cancelled,
}

impl From<poisnap_llm::LlmError> for BackendError {
    fn from(err: poisnap_llm::LlmError) -> Self {
        use poisnap_llm::LlmError;

        match err {
            LlmError::ModelLoad(reason) => BackendError::ModelNotLoaded(reason),
            LlmError::NotLoaded => BackendError::ModelNotLoaded("no model loaded".to_string()),
            LlmError::Generation(reason) => BackendError::ExtractionFailed(reason),
            LlmError::DeadlineExceeded => {
                BackendError::ExtractionFailed("generation deadline exceeded".to_string())
            }
            LlmError::Cancelled => BackendError::Cancelled,
            LlmError::Io(e) => BackendError::ExtractionFailed(e.to_string()),
        }
    }
}

/// Result type for the poisnap library.
pub type Result<T> = std::result::Result<T, PoisnapError>;
