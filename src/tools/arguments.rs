//! Typed access to tool call arguments.

use crate::error::AgentError;

/// Wrapper around the raw argument payload supplied by the model.
///
/// The payload is never validated before it reaches a handler; the typed
/// getters report malformed or missing values as [`AgentError::InvalidArgument`].
#[derive(Debug, Clone)]
pub struct ToolArguments {
    raw: String,
    value: Option<serde_json::Value>,
}

impl ToolArguments {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = if raw.trim().is_empty() {
            Some(serde_json::json!({}))
        } else {
            serde_json::from_str(&raw).ok()
        };
        Self { raw, value }
    }

    /// The payload exactly as the model sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The payload parsed as JSON.
    pub fn value(&self) -> Result<&serde_json::Value, AgentError> {
        self.value.as_ref().ok_or_else(|| {
            AgentError::InvalidArgument(format!("arguments are not valid JSON: {}", self.raw))
        })
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AgentError> {
        self.value()?
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.as_ref()?.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, AgentError> {
        self.value()?
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, AgentError> {
        self.value()?
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, AgentError> {
        self.value()?
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Get an array argument.
    pub fn get_array(&self, key: &str) -> Result<&Vec<serde_json::Value>, AgentError> {
        self.value()?
            .get(key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing array argument: {key}")))
    }

    /// Deserialize the entire payload into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AgentError> {
        serde_json::from_value(self.value()?.clone())
            .map_err(|e| AgentError::InvalidArgument(e.to_string()))
    }
}
