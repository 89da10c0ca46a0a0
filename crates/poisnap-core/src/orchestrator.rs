//! Policy-driven extraction pipeline.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use poisnap_llm::CancelFlag;

use crate::backend::{ExtractionMode, ExtractorBackend};
use crate::error::{BackendError, PoisnapError, Result};
use crate::extract::{merge_candidates, RuleExtractor};
use crate::models::PoiCandidate;

/// Default ceiling on one backend attempt.
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Input to one extraction request. At least one of the two parts
/// must be present.
#[derive(Debug, Clone, Default)]
pub struct ExtractionInput {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl ExtractionInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn from_image(image: Vec<u8>) -> Self {
        Self {
            text: None,
            image: Some(image),
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}

/// Which backends one extraction may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// Rules only, no backend call attempted.
    None,
    /// Exactly the named backend.
    Backend(String),
    /// Walk the registered backends in priority order.
    Auto,
}

impl ExtractionPolicy {
    /// Parse a policy string: "none", "auto", or a backend name.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "none" => ExtractionPolicy::None,
            "auto" => ExtractionPolicy::Auto,
            _ => ExtractionPolicy::Backend(value.trim().to_string()),
        }
    }
}

impl fmt::Display for ExtractionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionPolicy::None => write!(f, "none"),
            ExtractionPolicy::Backend(name) => write!(f, "{name}"),
            ExtractionPolicy::Auto => write!(f, "auto"),
        }
    }
}

/// How one backend attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Candidate accepted as the model result.
    Accepted,
    /// Backend answered but the candidate had no usable data.
    NoValidData,
    /// Backend reported itself unavailable.
    Unavailable,
    /// Backend call failed; carries the failure reason.
    Failed(String),
}

/// Record of one backend attempt, in the order attempts were made.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub backend: String,
    pub mode: ExtractionMode,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    fn new(backend: &str, mode: ExtractionMode, outcome: AttemptOutcome) -> Self {
        Self {
            backend: backend.to_string(),
            mode,
            outcome,
        }
    }
}

/// Where the final candidate came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Rule-based extraction alone.
    Rules,
    /// A vision-capable backend read the image directly.
    ImageDirect(String),
    /// Rule candidate merged with the named backend's candidate.
    Merged(String),
    /// Nothing produced usable data.
    Empty,
}

/// Outcome of one extraction request.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub candidate: PoiCandidate,
    pub used_model: bool,
    pub source: ReportSource,
    pub attempts: Vec<AttemptRecord>,
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    /// Whether the final candidate clears the usability bar.
    pub fn has_valid_data(&self) -> bool {
        self.candidate.has_valid_data()
    }
}

/// Walks backends according to policy and folds their results with
/// the rule-based extraction.
///
/// Image-direct extraction runs before the text path when an image
/// is present. On the text path the rules always run and the first
/// backend candidate with usable data is merged over them. Backend
/// failures are recorded per attempt and never abort the walk, with
/// one exception: explicit cancellation is escalated immediately.
pub struct Orchestrator {
    backends: Vec<Arc<dyn ExtractorBackend>>,
    rules: RuleExtractor,
    generation_timeout: Duration,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            rules: RuleExtractor::new(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Register a backend. Registration order is the auto-policy
    /// priority order.
    pub fn with_backend(mut self, backend: Arc<dyn ExtractorBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn with_rule_extractor(mut self, rules: RuleExtractor) -> Self {
        self.rules = rules;
        self
    }

    /// Ceiling on a single backend attempt. An attempt past the
    /// ceiling is recorded as failed with reason "timeout" and the
    /// walk proceeds.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Registered backends in priority order.
    pub fn backends(&self) -> &[Arc<dyn ExtractorBackend>] {
        &self.backends
    }

    pub async fn extract(
        &self,
        input: &ExtractionInput,
        policy: &ExtractionPolicy,
        cancel: &CancelFlag,
    ) -> Result<ExtractionReport> {
        let started = Instant::now();

        if input.text.is_none() && input.image.is_none() {
            return Err(PoisnapError::NotAvailable(
                "input has neither text nor image".to_string(),
            ));
        }

        let selected = self.select_backends(policy);
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        if let Some(image) = input.image.as_deref() {
            for backend in selected.iter().filter(|b| b.supports_image()) {
                if let Some(candidate) = self
                    .try_backend(backend.as_ref(), ExtractionMode::Image, None, Some(image), cancel, &mut attempts)
                    .await?
                {
                    return Ok(self.report(
                        candidate,
                        true,
                        ReportSource::ImageDirect(backend.name().to_string()),
                        attempts,
                        started,
                    ));
                }
            }
        }

        if let Some(text) = input.text.as_deref() {
            let rule_candidate = self.rules.extract(text);
            tracing::debug!(
                confidence = rule_candidate.confidence,
                valid = rule_candidate.has_valid_data(),
                "rule extraction finished"
            );

            for backend in selected.iter().filter(|b| b.supports_text()) {
                if let Some(candidate) = self
                    .try_backend(backend.as_ref(), ExtractionMode::Text, Some(text), None, cancel, &mut attempts)
                    .await?
                {
                    let merged = merge_candidates(&rule_candidate, &candidate);
                    return Ok(self.report(
                        merged,
                        true,
                        ReportSource::Merged(backend.name().to_string()),
                        attempts,
                        started,
                    ));
                }
            }

            return Ok(self.report(rule_candidate, false, ReportSource::Rules, attempts, started));
        }

        // Image-only input and no image attempt produced data. If no
        // attempt even ran, the pipeline had nothing to do.
        let any_ran = attempts
            .iter()
            .any(|a| !matches!(a.outcome, AttemptOutcome::Unavailable));
        if !any_ran {
            return Err(PoisnapError::NotAvailable(
                "no backend could serve this input".to_string(),
            ));
        }
        Ok(self.report(
            PoiCandidate::empty(),
            false,
            ReportSource::Empty,
            attempts,
            started,
        ))
    }

    /// Backends the policy allows, in priority order. A policy naming
    /// no registered backend selects nothing; with text present the
    /// walk still produces a rules-only report.
    fn select_backends(&self, policy: &ExtractionPolicy) -> Vec<Arc<dyn ExtractorBackend>> {
        match policy {
            ExtractionPolicy::None => Vec::new(),
            ExtractionPolicy::Auto => self.backends.clone(),
            ExtractionPolicy::Backend(name) => {
                let selected: Vec<_> = self
                    .backends
                    .iter()
                    .filter(|b| b.name() == name)
                    .cloned()
                    .collect();
                if selected.is_empty() {
                    tracing::warn!(backend = %name, "policy names no registered backend");
                }
                selected
            }
        }
    }

    /// One backend attempt. Returns a candidate only when the
    /// backend produced usable data; every other outcome lands in
    /// `attempts`. Cancellation is the one error that propagates.
    async fn try_backend(
        &self,
        backend: &dyn ExtractorBackend,
        mode: ExtractionMode,
        text: Option<&str>,
        image: Option<&[u8]>,
        cancel: &CancelFlag,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Result<Option<PoiCandidate>> {
        if cancel.is_cancelled() {
            return Err(PoisnapError::Backend(BackendError::Cancelled));
        }
        if !backend.is_available().await {
            tracing::debug!(backend = backend.name(), %mode, "backend unavailable");
            attempts.push(AttemptRecord::new(
                backend.name(),
                mode,
                AttemptOutcome::Unavailable,
            ));
            return Ok(None);
        }

        let call = async {
            match mode {
                ExtractionMode::Text => {
                    backend.extract_from_text(text.unwrap_or_default(), cancel).await
                }
                ExtractionMode::Image => {
                    backend
                        .extract_from_image(image.unwrap_or_default(), cancel)
                        .await
                }
            }
        };

        let outcome = match tokio::time::timeout(self.generation_timeout, call).await {
            Err(_) => {
                tracing::warn!(backend = backend.name(), %mode, "attempt timed out");
                AttemptOutcome::Failed("timeout".to_string())
            }
            Ok(Err(BackendError::Cancelled)) => {
                return Err(PoisnapError::Backend(BackendError::Cancelled));
            }
            Ok(Err(err)) => {
                tracing::warn!(backend = backend.name(), %mode, error = %err, "attempt failed");
                AttemptOutcome::Failed(err.to_string())
            }
            Ok(Ok(candidate)) if candidate.has_valid_data() => {
                attempts.push(AttemptRecord::new(
                    backend.name(),
                    mode,
                    AttemptOutcome::Accepted,
                ));
                return Ok(Some(candidate));
            }
            Ok(Ok(_)) => {
                tracing::debug!(backend = backend.name(), %mode, "candidate has no valid data");
                AttemptOutcome::NoValidData
            }
        };

        attempts.push(AttemptRecord::new(backend.name(), mode, outcome));
        Ok(None)
    }

    fn report(
        &self,
        candidate: PoiCandidate,
        used_model: bool,
        source: ReportSource,
        attempts: Vec<AttemptRecord>,
        started: Instant,
    ) -> ExtractionReport {
        ExtractionReport {
            candidate,
            used_model,
            source,
            attempts,
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}
