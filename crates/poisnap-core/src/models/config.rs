//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the poisnap pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoisnapConfig {
    /// Rule extraction tuning.
    pub extraction: ExtractionConfig,

    /// Orchestrator behavior.
    pub pipeline: PipelineConfig,

    /// Cloud API backend.
    pub cloud: CloudConfig,

    /// Local text model backend.
    pub local: LocalModelConfig,

    /// Vision model backend.
    pub vision: VisionConfig,

    /// On-device assistant daemon backend.
    pub assistant: AssistantConfig,
}

impl Default for PoisnapConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            pipeline: PipelineConfig::default(),
            cloud: CloudConfig::default(),
            local: LocalModelConfig::default(),
            vision: VisionConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

/// Rule-based extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum unclaimed lines joined into the name field.
    pub name_max_lines: usize,

    /// Fall back to labeled plain-text parsing when a model reply is not
    /// decodable JSON.
    pub plain_text_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_max_lines: 3,
            plain_text_fallback: true,
        }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Policy used when none is given on the command line.
    pub default_policy: String,

    /// Ceiling on one backend call, in seconds.
    pub generation_timeout_secs: u64,
}

impl PipelineConfig {
    /// Ceiling on one backend call.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_policy: "auto".to_string(),
            generation_timeout_secs: 60,
        }
    }
}

/// Cloud chat-completion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// API base URL (OpenAI-compatible).
    pub api_base: String,

    /// Bearer token; the backend reports itself unavailable without one.
    pub api_key: Option<String>,

    /// Model name sent with each request.
    pub model: String,

    /// HTTP request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Local text model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    /// Model weights path.
    pub model_path: PathBuf,

    /// Token ceiling per generation.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/poi-text.gguf"),
            max_tokens: 512,
            temperature: 0.1,
        }
    }
}

/// Vision model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Model weights path.
    pub model_path: PathBuf,

    /// Token ceiling per generation.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/poi-vision.gguf"),
            max_tokens: 512,
            temperature: 0.1,
        }
    }
}

/// On-device assistant daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Daemon base URL.
    pub base_url: String,

    /// Model name the daemon should serve.
    pub model: String,

    /// HTTP request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl PoisnapConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
