//! Configuration management for Scamguard.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ScamguardError};
use crate::ratelimit::RateLimitConfig;
use crate::retry::RetryConfig;

/// Environment prefix for overrides, e.g. `SCAMGUARD__SERVER__HTTP_ADDR`.
const ENV_PREFIX: &str = "SCAMGUARD";

/// Environment variable consulted when no provider key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main configuration for the Scamguard service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Retry policy for provider calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Text-generation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Quiz content configuration
    #[serde(default)]
    pub quiz: QuizConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// How often expired admission windows are swept, in milliseconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_ms: u64,

    /// Policy for the explanation endpoint
    #[serde(default)]
    pub explanation: RateLimitConfig,
}

impl RateLimitingConfig {
    /// The sweep interval as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            sweep_interval_ms: default_sweep_interval(),
            explanation: RateLimitConfig::default(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60_000
}

/// Text-generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// The per-call timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

/// Quiz content configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Path to a YAML quiz catalog
    #[serde(default)]
    pub catalog_path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from an optional file, overlaid by environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Adding configuration file source");
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: AppConfig = builder
            .build()
            .map_err(|e| ScamguardError::Config(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ScamguardError::Config(format!("Failed to parse configuration: {}", e)))?;

        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }

        config.validate()?;
        debug!("Configuration built and validated");
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ScamguardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make admission or backoff meaningless.
    pub fn validate(&self) -> Result<()> {
        let policy = &self.rate_limiting.explanation;
        if policy.max_requests == 0 {
            return Err(ScamguardError::Config(
                "rate_limiting.explanation.max_requests must be > 0".to_string(),
            ));
        }
        if policy.window_ms == 0 {
            return Err(ScamguardError::Config(
                "rate_limiting.explanation.window_ms must be > 0".to_string(),
            ));
        }
        if self.rate_limiting.sweep_interval_ms == 0 {
            return Err(ScamguardError::Config(
                "rate_limiting.sweep_interval_ms must be > 0".to_string(),
            ));
        }
        if self.retry.base_delay_ms == 0 {
            return Err(ScamguardError::Config(
                "retry.base_delay_ms must be > 0".to_string(),
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ScamguardError::Config(format!(
                "retry.max_delay_ms ({}) must be >= retry.base_delay_ms ({})",
                self.retry.max_delay_ms, self.retry.base_delay_ms
            )));
        }
        Ok(())
    }
}
