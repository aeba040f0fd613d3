//! AI configuration from environment variables.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default OpenAI-compatible base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default number of attempts per model call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default backoff unit in milliseconds.
pub const DEFAULT_BACKOFF_MS: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Model endpoint configuration.
///
/// Read-only once built; the gateway copies what it needs at construction.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the endpoint.
    pub api_key: String,
    /// Model name (e.g., "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Attempts per call, at least 1.
    pub max_retries: u32,
    /// Timeout for a single attempt.
    pub request_timeout: Duration,
    /// Backoff unit: the delay after attempt k is `backoff_unit * 2^k`.
    pub backoff_unit: Duration,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            backoff_unit: Duration::from_millis(DEFAULT_BACKOFF_MS),
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

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENAI_API_KEY`: API key
    ///
    /// Optional:
    /// - `WARDROBE_AI_MODEL`: Model name (default: "gpt-4o-mini")
    /// - `WARDROBE_AI_BASE_URL`: API base URL (default: "https://api.openai.com/v1")
    /// - `WARDROBE_AI_MAX_RETRIES`: Attempts per call (default: 3)
    /// - `WARDROBE_AI_TIMEOUT_SECS`: Per-attempt timeout (default: 60)
    /// - `WARDROBE_AI_BACKOFF_MS`: Backoff unit (default: 1000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let mut config = Self::new(api_key);

        if let Ok(model) = env::var("WARDROBE_AI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("WARDROBE_AI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(max_retries) = parse_var::<u32>("WARDROBE_AI_MAX_RETRIES")? {
            config.max_retries = max_retries;
        }
        if let Some(secs) = parse_var::<u64>("WARDROBE_AI_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>("WARDROBE_AI_BACKOFF_MS")? {
            config.backoff_unit = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid {
                name: "max_retries".to_string(),
                value: "0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "request_timeout".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL without a trailing slash, as the client appends `/chat/completions`.
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
