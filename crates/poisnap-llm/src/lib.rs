//! In-process language model session layer for poisnap.
//!
//! This crate owns the mechanics shared by the locally-hosted model
//! backends:
//! - `TextDecoder` / `ModelLoader`, the seam to a native inference library
//! - `ModelSession`, the load/generate/reset state machine
//! - `CancelFlag`, cooperative cancellation for in-flight generation
//!
//! The actual weights and sampling kernels live behind `TextDecoder`;
//! `ScriptedDecoder` replays canned replies for tests and offline use.

mod cancel;
mod decoder;
mod error;
mod session;

pub mod scripted;

pub use cancel::CancelFlag;
pub use decoder::{DecodeRequest, ModelLoader, TextDecoder};
pub use error::LlmError;
pub use session::{ModelSession, SessionState};

/// Result type for model session operations.
pub type Result<T> = std::result::Result<T, LlmError>;
