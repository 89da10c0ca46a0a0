//! Cloud backend speaking an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use poisnap_llm::CancelFlag;

use super::ExtractorBackend;
use crate::error::BackendError;
use crate::extract::{prompt, ResponseParser};
use crate::models::config::CloudConfig;
use crate::models::PoiCandidate;

pub const CLOUD_BACKEND_NAME: &str = "cloud";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Text-only backend for hosted chat completion APIs.
///
/// Availability is a pure configuration question: an API key must be
/// present. Network and status failures surface as
/// [`BackendError::ExtractionFailed`]; a reply that decodes but has
/// no choices is [`BackendError::InvalidResponse`]. Reply content
/// that merely fails to parse as POI JSON degrades through
/// [`ResponseParser`] instead of erroring.
pub struct CloudBackend {
    client: reqwest::Client,
    config: CloudConfig,
    parser: ResponseParser,
}

impl CloudBackend {
    pub fn new(config: CloudConfig) -> Result<Self, BackendError> {
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

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    async fn complete(&self, prompt_text: String, cancel: &CancelFlag) -> Result<String, BackendError> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        let Some(key) = self.api_key() else {
            return Err(BackendError::Unavailable);
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt_text,
            }],
            temperature: 0.1,
        };
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::ExtractionFailed(format!("request failed: {e}")))?;

        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if !response.status().is_success() {
            return Err(BackendError::ExtractionFailed(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("undecodable completion: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BackendError::InvalidResponse("completion has no choices".to_string()))
    }
}

#[async_trait]
impl ExtractorBackend for CloudBackend {
    fn name(&self) -> &str {
        CLOUD_BACKEND_NAME
    }

    async fn is_available(&self) -> bool {
        self.api_key().is_some()
    }

    async fn extract_from_text(
        &self,
        text: &str,
        cancel: &CancelFlag,
    ) -> Result<PoiCandidate, BackendError> {
        let reply = self.complete(prompt::text_prompt(text), cancel).await?;
        tracing::debug!(backend = self.name(), chars = reply.len(), "received completion");
        Ok(self.parser.parse(&reply))
    }
}
