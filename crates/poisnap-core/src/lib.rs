//! Core library for POI extraction from Japanese signage.
//!
//! This crate provides:
//! - Rule-based field extraction over OCR'd signage text
//! - Parsing of model completions into POI candidates
//! - Extraction backends (cloud API, assistant server, on-device models)
//! - A policy-driven orchestrator folding rule and model results

pub mod backend;
pub mod error;
pub mod extract;
pub mod models;
pub mod orchestrator;

pub use error::{BackendError, PoisnapError, Result};
pub use models::{PoiCandidate, PoisnapConfig, PoiRecord, VisitStatus};
pub use extract::{merge_candidates, ResponseParser, RuleExtractor};
pub use backend::{
    AssistantBackend, CloudBackend, ExtractionMode, ExtractorBackend, LocalTextBackend,
    VisionBackend,
};
pub use orchestrator::{
    AttemptOutcome, AttemptRecord, ExtractionInput, ExtractionPolicy, ExtractionReport,
    Orchestrator, ReportSource,
};

/// Re-export decode-layer types backends are constructed with.
pub use poisnap_llm::{CancelFlag, DecodeRequest, LlmError, ModelLoader, ModelSession, TextDecoder};
