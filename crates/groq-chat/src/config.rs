// Client configuration and the static model -> context budget lookup

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Model identifier that gets the large context budget
pub const LARGE_CONTEXT_MODEL: &str = "mixtral-8x7b-32768";

/// Budget for [`LARGE_CONTEXT_MODEL`] (32k window)
pub const LARGE_CONTEXT_MAX_TOKENS: u32 = 30000;

/// Budget for every other model (8k window: llama3, gemma)
pub const DEFAULT_MAX_TOKENS: u32 = 7000;

/// Token budget for `model`. An explicit value always wins.
pub fn resolve_max_tokens(model: &str, explicit: Option<u32>) -> u32 {
    explicit.unwrap_or_else(|| {
        if model.contains(LARGE_CONTEXT_MODEL) {
            LARGE_CONTEXT_MAX_TOKENS
        } else {
            DEFAULT_MAX_TOKENS
        }
    })
}

/// Settings for a Groq-backed chat model
#[derive(Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Secret, read from `GROQ_API_KEY` by [`GroqConfig::load`]
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the model's default budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    GROQ_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: None,
            temperature: None,
            timeout_ms: None,
        }
    }
}

impl fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Budget sent as `max_tokens` on every request
    pub fn effective_max_tokens(&self) -> u32 {
        resolve_max_tokens(&self.model, self.max_tokens)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from an optional TOML file and the environment
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/groq.toml
    /// 2. GROQ_MODEL, GROQ_MAX_TOKENS, GROQ_BASE_URL, GROQ_TEMPERATURE, GROQ_TIMEOUT_MS
    ///
    /// `GROQ_API_KEY` is required.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/groq").required(false))
            .add_source(Environment::with_prefix("GROQ").try_parsing(true));

        let mut cfg: GroqConfig = builder.build()?.try_deserialize()?;

        cfg.api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ConfigError::Message("GROQ_API_KEY environment variable is required".to_string()))?;

        Ok(cfg)
    }

    /// Load config from a specific file (no environment lookup)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}
