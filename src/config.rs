// ABOUTME: Configuration module for the course-agent application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{AgentError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-oss:120b";
pub const DEFAULT_RECIPIENT_DOMAIN: &str = "gs.ncku.edu.tw";

/// Settings for the language-model endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where Google API credentials come from
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    /// Pre-issued OAuth access token; wins over service-account settings
    pub access_token: Option<String>,
    pub service_account_key: Option<PathBuf>,
    pub service_account_json: Option<String>,
    /// User to impersonate through domain-wide delegation
    pub delegated_user: Option<String>,
}

/// Application configuration, built once and passed into the workflow
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub google: GoogleConfig,
    pub recipient_domain: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            google: GoogleConfig::default(),
            recipient_domain: DEFAULT_RECIPIENT_DOMAIN.to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_url: env_string("API_URL").unwrap_or_default(),
            api_key: env_string("API_KEY").unwrap_or_default(),
            model: env_string("MODEL_NAME").unwrap_or(defaults.model),
            temperature: env_parsed("LLM_TEMPERATURE").unwrap_or(defaults.temperature),
            connect_timeout_secs: env_parsed("LLM_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            request_timeout_secs: env_parsed("LLM_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
        };

        let google = GoogleConfig {
            access_token: env_string("GOOGLE_ACCESS_TOKEN"),
            service_account_key: env_string("GOOGLE_SERVICE_ACCOUNT_KEY").map(PathBuf::from),
            service_account_json: env_string("GOOGLE_SERVICE_ACCOUNT_JSON"),
            delegated_user: env_string("GOOGLE_DELEGATED_USER"),
        };

        let recipient_domain = env_string("RECIPIENT_DOMAIN")
            .unwrap_or_else(|| DEFAULT_RECIPIENT_DOMAIN.to_string());

        Self {
            llm,
            google,
            recipient_domain,
        }
    }

    /// Check the settings the language-model call depends on
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(AgentError::ConfigError(
                "API_KEY is not set; add it to the environment or a .env file".to_string(),
            ));
        }
        if self.llm.api_url.is_empty() {
            return Err(AgentError::ConfigError("API_URL is not set".to_string()));
        }
        Url::parse(&self.llm.api_url).map_err(|e| {
            AgentError::ConfigError(format!("API_URL `{}` is invalid: {}", self.llm.api_url, e))
        })?;
        if self.llm.request_timeout_secs == 0 {
            return Err(AgentError::ConfigError(
                "LLM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// True when some Google credential source is configured
    pub fn has_google_credentials(&self) -> bool {
        self.google.access_token.is_some()
            || self.google.service_account_key.is_some()
            || self.google.service_account_json.is_some()
    }
}

// Blank values count as unset; surrounding whitespace is dropped.
fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|s| s.parse::<T>().ok())
}
