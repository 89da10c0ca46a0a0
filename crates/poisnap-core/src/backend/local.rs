//! On-device text model backend.

use async_trait::async_trait;
use tokio::sync::Mutex;

use poisnap_llm::{CancelFlag, DecodeRequest, ModelLoader, ModelSession};

use super::ExtractorBackend;
use crate::error::BackendError;
use crate::extract::{prompt, ResponseParser};
use crate::models::config::LocalModelConfig;
use crate::models::PoiCandidate;

pub const LOCAL_BACKEND_NAME: &str = "local";

/// Backend running a bundled text model in-process.
///
/// The session loads lazily on first use and stays loaded across
/// calls. One mutex serializes generations; the session itself is
/// not internally synchronized.
pub struct LocalTextBackend {
    session: Mutex<ModelSession>,
    parser: ResponseParser,
    max_tokens: usize,
    temperature: f32,
}

impl LocalTextBackend {
    pub fn new(config: &LocalModelConfig, loader: Box<dyn ModelLoader>) -> Self {
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
impl ExtractorBackend for LocalTextBackend {
    fn name(&self) -> &str {
        LOCAL_BACKEND_NAME
    }

    async fn is_available(&self) -> bool {
        let session = self.session.lock().await;
        session.is_loaded() || session.model_path().exists()
    }

    async fn extract_from_text(
        &self,
        text: &str,
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        let request = DecodeRequest::text(prompt::text_prompt(text))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let mut session = self.session.lock().await;
        session.ensure_loaded()?;
        let reply = session.generate(&request, cancel).await?;
        drop(session);

        tracing::debug!(backend = self.name(), chars = reply.len(), "generation finished");
        Ok(self.parser.parse(&reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poisnap_llm::scripted::ScriptedLoader;
    use pretty_assertions::assert_eq;

    fn config() -> LocalModelConfig {
        LocalModelConfig {
            model_path: std::path::PathBuf::from("/nonexistent/poi-text.gguf"),
            max_tokens: 256,
            temperature: 0.1,
        }
    }

    #[tokio::test]
    async fn test_extracts_candidate_from_scripted_reply() {
        let reply = r#"{"name":"喫茶ロマン","address":"東京都台東区1-2-3","phone":null,"hours":null,"category":"カフェ","priceRange":null}"#;
        let backend = LocalTextBackend::new(&config(), Box::new(ScriptedLoader::new(reply)));

        let candidate = backend
            .extract_from_text("喫茶ロマン", &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(candidate.name.as_deref(), Some("喫茶ロマン"));
        assert_eq!(candidate.address.as_deref(), Some("東京都台東区1-2-3"));
        assert_eq!(candidate.category.as_deref(), Some("カフェ"));
        assert!((candidate.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_load_maps_to_model_not_loaded() {
        let backend = LocalTextBackend::new(
            &config(),
            Box::new(ScriptedLoader::failing("weights missing")),
        );

        let err = backend
            .extract_from_text("text", &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ModelNotLoaded(_)));
    }

    #[tokio::test]
    async fn test_cancelled_generation_maps_to_cancelled() {
        let backend = LocalTextBackend::new(&config(), Box::new(ScriptedLoader::new("reply")));
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = backend
            .extract_from_text("text", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Cancelled));
    }

    #[tokio::test]
    async fn test_unavailable_when_model_file_missing() {
        let backend = LocalTextBackend::new(&config(), Box::new(ScriptedLoader::new("{}")));
        assert!(!backend.is_available().await);
    }

    #[tokio::test]
    async fn test_image_mode_is_rejected() {
        let backend = LocalTextBackend::new(&config(), Box::new(ScriptedLoader::new("{}")));
        let err = backend
            .extract_from_image(&[0xFF, 0xD8], &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ExtractionFailed(_)));
    }
}
