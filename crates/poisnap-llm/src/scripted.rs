//! Scripted decoder and loader for tests and offline development.
//!
//! The scripted pair replays a fixed reply in small token chunks through
//! the real session machinery, so backend and orchestrator behavior can be
//! exercised without model weights.

use std::path::Path;

use crate::decoder::{DecodeRequest, ModelLoader, TextDecoder};
use crate::error::LlmError;
use crate::Result;

/// Characters per scripted token.
const TOKEN_CHARS: usize = 4;

/// A decoder that replays a canned reply token by token.
pub struct ScriptedDecoder {
    tokens: Vec<String>,
    cursor: usize,
    primed: bool,
    fail_at: Option<usize>,
    stall: bool,
}

impl ScriptedDecoder {
    /// Create a decoder that replays `reply`.
    pub fn new(reply: &str) -> Self {
        let chars: Vec<char> = reply.chars().collect();
        let tokens = chars
            .chunks(TOKEN_CHARS)
            .map(|chunk| chunk.iter().collect())
            .collect();

        Self {
            tokens,
            cursor: 0,
            primed: false,
            fail_at: None,
            stall: false,
        }
    }

    /// Fail with a generation error once `token_index` is reached.
    pub fn failing_at(mut self, token_index: usize) -> Self {
        self.fail_at = Some(token_index);
        self
    }

    /// Keep emitting filler tokens once the reply is exhausted, so a
    /// generation never finishes on its own.
    pub fn stalling(mut self) -> Self {
        self.stall = true;
        self
    }
}

impl TextDecoder for ScriptedDecoder {
    fn begin(&mut self, _request: &DecodeRequest) -> Result<()> {
        self.cursor = 0;
        self.primed = true;
        Ok(())
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        if !self.primed {
            return Err(LlmError::Generation("decode context not primed".to_string()));
        }
        if self.fail_at == Some(self.cursor) {
            return Err(LlmError::Generation("scripted decode failure".to_string()));
        }

        match self.tokens.get(self.cursor) {
            Some(token) => {
                self.cursor += 1;
                Ok(Some(token.clone()))
            }
            None if self.stall => Ok(Some(" ".to_string())),
            None => Ok(None),
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.primed = false;
    }
}

/// A loader that produces [`ScriptedDecoder`]s, or refuses to load.
pub struct ScriptedLoader {
    reply: String,
    fail_reason: Option<String>,
    fail_token: Option<usize>,
    stall: bool,
}

impl ScriptedLoader {
    /// Loader whose decoders replay `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail_reason: None,
            fail_token: None,
            stall: false,
        }
    }

    /// Loader that always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: String::new(),
            fail_reason: Some(reason.into()),
            fail_token: None,
            stall: false,
        }
    }

    /// Loader whose decoders never finish a generation.
    pub fn stalling() -> Self {
        Self {
            reply: String::new(),
            fail_reason: None,
            fail_token: None,
            stall: true,
        }
    }

    /// Decoders fail mid-generation at the given token index.
    pub fn failing_at_token(mut self, token_index: usize) -> Self {
        self.fail_token = Some(token_index);
        self
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(&self, _path: &Path) -> Result<Box<dyn TextDecoder>> {
        if let Some(reason) = &self.fail_reason {
            return Err(LlmError::ModelLoad(reason.clone()));
        }

        let mut decoder = ScriptedDecoder::new(&self.reply);
        if let Some(index) = self.fail_token {
            decoder = decoder.failing_at(index);
        }
        if self.stall {
            decoder = decoder.stalling();
        }
        Ok(Box::new(decoder))
    }
}
