//! Agent configuration (layered: code > env > config file).

use std::fmt;
use std::path::Path;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Iteration ceiling used when none (or zero) is configured.
pub const DEFAULT_MAX_LOOPS: usize = 20;

const API_KEY_ENV: &str = "AGENT_API_KEY";
const API_URL_ENV: &str = "AGENT_API_URL";
const MODEL_ENV: &str = "AGENT_MODEL";
const SYSTEM_PROMPT_ENV: &str = "AGENT_SYSTEM_PROMPT";
const MAX_LOOPS_ENV: &str = "AGENT_MAX_LOOPS";
const TEMPERATURE_ENV: &str = "AGENT_TEMPERATURE";

/// Everything needed to talk to the completion endpoint and drive the loop.
///
/// All string fields are required; [`AgentConfig::validate`] rejects empty
/// values before any loop runs.
///
/// ```
/// use agentloop::config::AgentConfig;
///
/// let config = AgentConfig::builder()
///     .api_key("sk-test")
///     .api_url("https://api.example.com/v1/chat/completions")
///     .model("gpt-4o-mini")
///     .system_prompt("You are a helpful assistant.")
///     .build();
/// assert_eq!(config.max_loops(), 20);
/// ```
#[derive(Clone, Builder, Serialize, Deserialize)]
pub struct AgentConfig {
    #[builder(into)]
    pub api_key: String,
    #[builder(into)]
    pub api_url: String,
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub system_prompt: String,
    /// Iteration ceiling; `0` means [`DEFAULT_MAX_LOOPS`].
    #[builder(default = DEFAULT_MAX_LOOPS)]
    #[serde(default = "default_max_loops")]
    pub max_loops: usize,
    /// Sampling temperature; `0` leaves it to the endpoint.
    #[builder(default)]
    #[serde(default)]
    pub temperature: f64,
}

fn default_max_loops() -> usize {
    DEFAULT_MAX_LOOPS
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("api_key", &"..")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("max_loops", &self.max_loops)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AgentConfig {
    /// Load from `AGENT_*` environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, AgentError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup using the `AGENT_*` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_loops = match lookup(MAX_LOOPS_ENV) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                AgentError::Configuration(format!("{MAX_LOOPS_ENV} must be a non-negative integer"))
            })?,
            None => DEFAULT_MAX_LOOPS,
        };
        let temperature = match lookup(TEMPERATURE_ENV) {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                AgentError::Configuration(format!("{TEMPERATURE_ENV} must be a number"))
            })?,
            None => 0.0,
        };

        let config = Self {
            api_key: lookup(API_KEY_ENV).unwrap_or_default(),
            api_url: lookup(API_URL_ENV).unwrap_or_default(),
            model: lookup(MODEL_ENV).unwrap_or_default(),
            system_prompt: lookup(SYSTEM_PROMPT_ENV).unwrap_or_default(),
            max_loops,
            temperature,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file with the same field names as this struct.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AgentError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject missing required setup.
    pub fn validate(&self) -> Result<(), AgentError> {
        let required = [
            (&self.api_url, "API URL is required"),
            (&self.api_key, "API key is required"),
            (&self.model, "model is required"),
            (&self.system_prompt, "system prompt is required"),
        ];
        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(AgentError::Configuration(message.to_string()));
            }
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(AgentError::Configuration(
                "temperature must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective iteration ceiling.
    pub fn max_loops(&self) -> usize {
        if self.max_loops == 0 {
            DEFAULT_MAX_LOOPS
        } else {
            self.max_loops
        }
    }
}
