//! Model session state machine.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::decoder::{DecodeRequest, ModelLoader, TextDecoder};
use crate::error::LlmError;
use crate::Result;

/// Default ceiling for one generation.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Lifecycle state of a model session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No decoder is held.
    Unloaded,
    /// Weights are being loaded from disk.
    Loading,
    /// A decoder is held and idle.
    Ready,
    /// A generation is in flight.
    Generating,
}

/// A loaded model plus its decode lifecycle.
///
/// The session enforces the state machine
/// `Unloaded -> Loading -> Ready -> (Generating -> Ready)*`. A failed load
/// drops back to `Unloaded`. Every generation, whatever its outcome, resets
/// the decoder context and returns the session to `Ready` so the next call
/// starts clean.
///
/// Sessions are not internally synchronized; callers that share one across
/// tasks must serialize access (the backends wrap sessions in a mutex).
pub struct ModelSession {
    model_path: PathBuf,
    loader: Box<dyn ModelLoader>,
    decoder: Option<Box<dyn TextDecoder>>,
    state: SessionState,
    deadline: Duration,
}

impl ModelSession {
    /// Create an unloaded session for the model at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            model_path: model_path.into(),
            loader,
            decoder: None,
            state: SessionState::Unloaded,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Set the per-generation completion deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a decoder is currently held.
    pub fn is_loaded(&self) -> bool {
        self.decoder.is_some()
    }

    /// Path of the model this session loads.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Load the model if it is not already loaded.
    ///
    /// A failed load returns the session to `Unloaded`; callers surface
    /// that as a model-not-loaded condition and do not retry within the
    /// same extraction attempt.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if matches!(self.state, SessionState::Ready | SessionState::Generating) {
            return Ok(());
        }

        info!(model = %self.model_path.display(), "loading model");
        self.state = SessionState::Loading;

        match self.loader.load(&self.model_path) {
            Ok(decoder) => {
                self.decoder = Some(decoder);
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(model = %self.model_path.display(), error = %e, "model load failed");
                self.decoder = None;
                self.state = SessionState::Unloaded;
                Err(e)
            }
        }
    }

    /// Drop the decoder and return to `Unloaded`.
    pub fn unload(&mut self) {
        self.decoder = None;
        self.state = SessionState::Unloaded;
    }

    /// Run one generation to completion.
    ///
    /// The loop checks the cancel flag and the deadline between token
    /// steps and yields to the runtime each iteration, so a long decode
    /// neither starves the executor nor outlives its ceiling. The decoder
    /// context is reset and the session returned to `Ready` on every exit,
    /// including the caller dropping this future mid-decode.
    pub async fn generate(&mut self, request: &DecodeRequest, cancel: &CancelFlag) -> Result<String> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Unloaded | SessionState::Loading => return Err(LlmError::NotLoaded),
            SessionState::Generating => {
                return Err(LlmError::Generation(
                    "a generation is already in flight".to_string(),
                ));
            }
        }

        let deadline = self.deadline;
        let decoder = self.decoder.as_mut().ok_or(LlmError::NotLoaded)?;
        self.state = SessionState::Generating;

        // The decoder stays seated in the session; the guard's drop is the
        // single restore path for context and state.
        let guard = ResetOnExit {
            decoder,
            state: &mut self.state,
        };
        run_decode(guard.decoder.as_mut(), request, cancel, deadline).await
    }
}

/// Restores a clean `Ready` session when a generation ends, whether it
/// returned normally or was dropped at an await point.
struct ResetOnExit<'a> {
    decoder: &'a mut Box<dyn TextDecoder>,
    state: &'a mut SessionState,
}

impl Drop for ResetOnExit<'_> {
    fn drop(&mut self) {
        // Decode context must not leak into the next call.
        self.decoder.reset();
        *self.state = SessionState::Ready;
    }
}

async fn run_decode(
    decoder: &mut dyn TextDecoder,
    request: &DecodeRequest,
    cancel: &CancelFlag,
    deadline: Duration,
) -> Result<String> {
    decoder.begin(request)?;

    let started = Instant::now();
    let mut output = String::new();
    let mut produced = 0usize;

    loop {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        if started.elapsed() >= deadline {
            return Err(LlmError::DeadlineExceeded);
        }

        match decoder.next_token()? {
            Some(token) => {
                output.push_str(&token);
                produced += 1;
                if produced >= request.max_tokens {
                    debug!(produced, "token ceiling reached");
                    break;
                }
            }
            None => break,
        }

        tokio::task::yield_now().await;
    }

    debug!(produced, elapsed_ms = started.elapsed().as_millis() as u64, "generation complete");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedLoader;

    fn session(reply: &str) -> ModelSession {
        ModelSession::new("/tmp/model.bin", Box::new(ScriptedLoader::new(reply)))
    }

    #[test]
    fn test_load_transitions_to_ready() {
        let mut s = session("{}");
        assert_eq!(s.state(), SessionState::Unloaded);
        assert!(!s.is_loaded());

        s.ensure_loaded().unwrap();
        assert_eq!(s.state(), SessionState::Ready);
        assert!(s.is_loaded());

        // Idempotent once loaded.
        s.ensure_loaded().unwrap();
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn test_failed_load_falls_back_to_unloaded() {
        let mut s = ModelSession::new(
            "/tmp/missing.bin",
            Box::new(ScriptedLoader::failing("weights corrupt")),
        );

        let err = s.ensure_loaded().unwrap_err();
        assert!(matches!(err, LlmError::ModelLoad(_)));
        assert_eq!(s.state(), SessionState::Unloaded);
        assert!(!s.is_loaded());
    }

    #[tokio::test]
    async fn test_generate_requires_loaded_model() {
        let mut s = session("ignored");
        let err = s
            .generate(&DecodeRequest::text("hi"), &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::NotLoaded));
    }

    #[tokio::test]
    async fn test_generate_assembles_scripted_reply() {
        let reply = r#"{"name": "カフェ青山", "address": null}"#;
        let mut s = session(reply);
        s.ensure_loaded().unwrap();

        let out = s
            .generate(&DecodeRequest::text("prompt"), &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(out, reply);
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_cancelled_generation_resets_and_stays_usable() {
        let mut s = session("hello world");
        s.ensure_loaded().unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = s
            .generate(&DecodeRequest::text("prompt"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Cancelled));
        assert_eq!(s.state(), SessionState::Ready);

        // A fresh call starts from a clean context.
        let out = s
            .generate(&DecodeRequest::text("prompt"), &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(out, "hello world");
    }

    #[tokio::test]
    async fn test_deadline_exceeded_returns_to_ready() {
        let mut s = session("slow reply").with_deadline(Duration::ZERO);
        s.ensure_loaded().unwrap();

        let err = s
            .generate(&DecodeRequest::text("prompt"), &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::DeadlineExceeded));
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_token_ceiling_truncates_output() {
        let mut s = session("abcdefghijkl");
        s.ensure_loaded().unwrap();

        let request = DecodeRequest::text("prompt").with_max_tokens(2);
        let out = s.generate(&request, &CancelFlag::new()).await.unwrap();
        // Scripted tokens are four characters long.
        assert_eq!(out, "abcdefgh");
    }

    #[tokio::test]
    async fn test_dropped_generate_future_restores_ready() {
        let mut s = ModelSession::new("/tmp/model.bin", Box::new(ScriptedLoader::stalling()))
            .with_deadline(Duration::from_millis(200));
        s.ensure_loaded().unwrap();

        // Drop the generation mid-decode, the way an outer timeout does.
        let request = DecodeRequest::text("prompt").with_max_tokens(usize::MAX);
        let timed_out = tokio::time::timeout(
            Duration::from_millis(50),
            s.generate(&request, &CancelFlag::new()),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(s.state(), SessionState::Ready);
        assert!(s.is_loaded());

        // The next call runs a fresh decode instead of reporting one in flight.
        let err = s.generate(&request, &CancelFlag::new()).await.unwrap_err();
        assert!(matches!(err, LlmError::DeadlineExceeded));
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[test]
    fn test_unload_drops_decoder() {
        let mut s = session("{}");
        s.ensure_loaded().unwrap();
        s.unload();
        assert_eq!(s.state(), SessionState::Unloaded);
        assert!(!s.is_loaded());
    }
}
