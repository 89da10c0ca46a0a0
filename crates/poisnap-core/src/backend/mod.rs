//! Extraction backend implementations.

pub mod assistant;
pub mod cloud;
pub mod local;
pub mod vision;

pub use assistant::AssistantBackend;
pub use cloud::CloudBackend;
pub use local::LocalTextBackend;
pub use vision::VisionBackend;

use std::fmt;

use async_trait::async_trait;

use poisnap_llm::CancelFlag;

use crate::error::BackendError;
use crate::models::PoiCandidate;

/// Input mode of a single extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Text,
    Image,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Text => write!(f, "text"),
            ExtractionMode::Image => write!(f, "image"),
        }
    }
}

/// Trait for model-backed extraction backends.
///
/// Backends are interchangeable from the orchestrator's point of
/// view: each advertises which input modes it accepts and whether it
/// can serve requests right now, and returns a candidate or a
/// [`BackendError`]. Implementations must be safe to share across
/// tasks; backends holding a loaded model serialize access
/// internally.
#[async_trait]
pub trait ExtractorBackend: Send + Sync {
    /// Stable name used in policies and attempt records.
    fn name(&self) -> &str;

    /// Whether the backend can serve a request right now.
    async fn is_available(&self) -> bool;

    fn supports_text(&self) -> bool {
        true
    }

    fn supports_image(&self) -> bool {
        false
    }

    /// Extract POI fields from OCR text.
    async fn extract_from_text(
        &self,
        text: &str,
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError>;

    /// Extract POI fields straight from an image, bypassing OCR.
    async fn extract_from_image(
        &self,
        _image: &[u8],
        _cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        Err(BackendError::ExtractionFailed(
            "image mode not supported".to_string(),
        ))
    }
}
