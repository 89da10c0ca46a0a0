//! Local assistant backend speaking the Ollama chat API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use poisnap_llm::CancelFlag;

use super::ExtractorBackend;
use crate::error::BackendError;
use crate::extract::{prompt, ResponseParser};
use crate::models::config::AssistantConfig;
use crate::models::PoiCandidate;

pub const ASSISTANT_BACKEND_NAME: &str = "assistant";

/// Ceiling for the availability probe. The probe must answer fast
/// even when the generation timeout is generous.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct AssistantRequest<'a> {
    model: &'a str,
    messages: Vec<AssistantMessage>,
    stream: bool,
    format: &'static str,
}

#[derive(Debug, Serialize)]
struct AssistantMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AssistantResponse {
    message: AssistantReply,
}

#[derive(Debug, Deserialize)]
struct AssistantReply {
    content: String,
}

/// Backend for a locally running assistant server.
///
/// Speaks the Ollama chat shape: `POST /api/chat` with `stream:
/// false` and `format: "json"`, probing `GET /api/tags` for
/// availability. Image mode ships the JPEG bytes base64-encoded in
/// the message's `images` array, which is how multimodal models such
/// as llava receive pictures.
pub struct AssistantBackend {
    client: reqwest::Client,
    config: AssistantConfig,
    parser: ResponseParser,
}

impl AssistantBackend {
    pub fn new(config: AssistantConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("poisnap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BackendError::ExtractionFailed(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            config,
            parser: ResponseParser::new(),
        })
    }

    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn chat(&self, message: AssistantMessage, cancel: &CancelFlag) -> Result<String, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }

        let request = AssistantRequest {
            model: &self.config.model,
            messages: vec![message],
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::ExtractionFailed(format!("request failed: {e}")))?;

        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        // A 404 from the chat endpoint means the model is not pulled.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::ModelNotLoaded(self.config.model.clone()));
        }
        if !response.status().is_success() {
            return Err(BackendError::ExtractionFailed(format!(
                "assistant returned status {}",
                response.status()
            )));
        }

        let reply: AssistantResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("undecodable reply: {e}")))?;

        Ok(reply.message.content)
    }
}

#[async_trait]
impl ExtractorBackend for AssistantBackend {
    fn name(&self) -> &str {
        ASSISTANT_BACKEND_NAME
    }

    async fn is_available(&self) -> bool {
        let probe = self
            .client
            .get(self.endpoint("/api/tags"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match probe {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(error = %err, "assistant probe failed");
                false
            }
        }
    }

    fn supports_image(&self) -> bool {
        true
    }

    async fn extract_from_text(
        &self,
        text: &str,
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        let message = AssistantMessage {
            role: "user",
            content: prompt::text_prompt(text),
            images: None,
        };
        let reply = self.chat(message, cancel).await?;
        tracing::debug!(backend = self.name(), chars = reply.len(), "received reply");
        Ok(self.parser.parse(&reply))
    }

    async fn extract_from_image(
        &self,
        image: &[u8],
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let message = AssistantMessage {
            role: "user",
            content: prompt::image_prompt(),
            images: Some(vec![encoded]),
        };
        let reply = self.chat(message, cancel).await?;
        tracing::debug!(backend = self.name(), chars = reply.len(), "received image reply");
        Ok(self.parser.parse(&reply))
    }
}
