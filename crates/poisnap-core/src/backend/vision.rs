//! On-device vision model backend.

use async_trait::async_trait;
use tokio::sync::Mutex;

use poisnap_llm::{CancelFlag, DecodeRequest, ModelLoader, ModelSession};

use super::ExtractorBackend;
use crate::error::BackendError;
use crate::extract::{prompt, ResponseParser};
use crate::models::config::VisionConfig;
use crate::models::PoiCandidate;

pub const VISION_BACKEND_NAME: &str = "vision";

/// Default confidence bonus for reading the photo directly.
const DEFAULT_IMAGE_BONUS: f32 = 0.2;

/// Backend running a bundled multimodal model in-process.
///
/// Image-only: it reads the signage photo itself instead of an OCR
/// transcript, and its candidates carry a fixed confidence bonus,
/// capped at 1.0.
pub struct VisionBackend {
    session: Mutex<ModelSession>,
    parser: ResponseParser,
    max_tokens: usize,
    temperature: f32,
}

impl VisionBackend {
    pub fn new(config: &VisionConfig, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            session: Mutex::new(ModelSession::new(&config.model_path, loader)),
            parser: ResponseParser::new(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }
}

#[async_trait]
impl ExtractorBackend for VisionBackend {
    fn name(&self) -> &str {
        VISION_BACKEND_NAME
    }

    async fn is_available(&self) -> bool {
        let session = self.session.lock().await;
        session.is_loaded() || session.model_path().exists()
    }

    fn supports_text(&self) -> bool {
        false
    }

    fn supports_image(&self) -> bool {
        true
    }

    async fn extract_from_text(
        &self,
        _text: &str,
        _cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        Err(BackendError::ExtractionFailed(
            "text mode not supported".to_string(),
        ))
    }

    async fn extract_from_image(
        &self,
        image: &[u8],
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        let request = DecodeRequest::text(prompt::image_prompt())
            .with_image(image.to_vec())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let mut session = self.session.lock().await;
        session.ensure_loaded()?;
        let reply = session.generate(&request, cancel).await?;
        drop(session);

        tracing::debug!(backend = self.name(), chars = reply.len(), "generation finished");
        Ok(self.parser.parse(&reply).with_bonus(DEFAULT_IMAGE_BONUS))
    }
}
