//! Error types for agentloop.

pub mod unified;

pub use unified::ErrorCategory;

use thiserror::Error;

/// Primary error type for all agentloop operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("no response from API")]
    EmptyResponse,

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("human input is not available outside an interactive session")]
    InputUnavailable,

    #[error("maximum loop iterations ({limit}) exceeded")]
    IterationLimitExceeded { limit: usize },

    #[error("unrecognized finish reason: {0:?}")]
    UnrecognizedFinishReason(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("session context cancelled")]
    ContextCancelled,

    #[error("a turn is already running in this session")]
    TurnInProgress,
}

impl AgentError {
    /// Create an API error from a status and body.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error, for use inside tool handlers.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::ConfigFile(_) => ErrorCategory::Configuration,
            Self::Api { .. }
            | Self::Network(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Authentication(_)
            | Self::RateLimited { .. }
            | Self::EmptyResponse => ErrorCategory::Transport,
            Self::ToolNotFound(_)
            | Self::ToolExecution { .. }
            | Self::InvalidArgument(_)
            | Self::InputUnavailable => ErrorCategory::Tool,
            Self::IterationLimitExceeded { .. } => ErrorCategory::IterationLimit,
            Self::UnrecognizedFinishReason(_) => ErrorCategory::Protocol,
            Self::SessionClosed | Self::ContextCancelled | Self::TurnInProgress => {
                ErrorCategory::Session
            }
        }
    }

    /// Whether this error ends the turn it occurred in.
    ///
    /// Tool-level failures are folded back into the conversation instead.
    pub fn is_fatal_to_turn(&self) -> bool {
        self.category().is_fatal_to_turn()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_errors_are_absorbed() {
        assert!(!AgentError::ToolNotFound("nope".into()).is_fatal_to_turn());
        assert!(!AgentError::tool("echo", "boom").is_fatal_to_turn());
        assert!(!AgentError::InvalidArgument("x".into()).is_fatal_to_turn());
        assert!(!AgentError::InputUnavailable.is_fatal_to_turn());
    }

    #[test]
    fn loop_ending_errors_are_fatal() {
        assert!(AgentError::IterationLimitExceeded { limit: 3 }.is_fatal_to_turn());
        assert!(AgentError::api(500, "down").is_fatal_to_turn());
        assert!(AgentError::EmptyResponse.is_fatal_to_turn());
        assert!(AgentError::UnrecognizedFinishReason("length".into()).is_fatal_to_turn());
        assert!(AgentError::ContextCancelled.is_fatal_to_turn());
    }

    #[test]
    fn iteration_limit_message_names_the_ceiling() {
        let err = AgentError::IterationLimitExceeded { limit: 20 };
        assert_eq!(err.to_string(), "maximum loop iterations (20) exceeded");
        assert_eq!(err.category(), ErrorCategory::IterationLimit);
    }

    #[test]
    fn tool_not_found_message() {
        assert_eq!(
            AgentError::ToolNotFound("weather".into()).to_string(),
            "tool not found: weather"
        );
    }
}
