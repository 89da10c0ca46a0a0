//! Decoder trait - the seam between the session layer and a native
//! inference library.

use std::path::Path;

use crate::Result;

/// A single generation request for the decode loop.
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    /// Full prompt text, instruction template included.
    pub prompt: String,

    /// Raw JPEG bytes for vision models; `None` for text-only models.
    pub image: Option<Vec<u8>>,

    /// Maximum number of tokens to sample before stopping.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: f32,
}

impl DecodeRequest {
    /// Build a text-only request with the given prompt.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            max_tokens: 512,
            temperature: 0.1,
        }
    }

    /// Attach raw image bytes to the request.
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Set the token ceiling.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for token-by-token text decoders.
///
/// Implementations wrap a loaded model plus its mutable decode context
/// (token buffer, KV cache). The session layer drives the loop and owns
/// the lifecycle rules: `begin` is always paired with a final `reset`,
/// whether generation finished, failed, or was cancelled.
pub trait TextDecoder: Send {
    /// Prime the decode context with a request, discarding prior state.
    fn begin(&mut self, request: &DecodeRequest) -> Result<()>;

    /// Sample the next token, or `None` once generation is complete.
    fn next_token(&mut self) -> Result<Option<String>>;

    /// Clear the decode context so the next `begin` starts clean.
    fn reset(&mut self);
}

/// Trait for loading a decoder from model files on disk.
pub trait ModelLoader: Send + Sync {
    /// Load model weights and return a ready decoder.
    fn load(&self, path: &Path) -> Result<Box<dyn TextDecoder>>;
}
