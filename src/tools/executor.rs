//! Tool lookup, invocation and result encoding.

use tracing::{info, warn};

use super::arguments::ToolArguments;
use super::registry::ToolRegistry;
use super::tool::ToolContext;
use crate::error::AgentError;
use crate::types::ToolCallRequest;

/// Encoded result of one tool call, ready to become a tool message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    /// Wrap a failure as the `{"error": "..."}` payload the model sees.
    ///
    /// A handler's own failure is passed through as its message; other
    /// errors use their display text.
    pub fn failure(err: &AgentError) -> Self {
        let message = match err {
            AgentError::ToolExecution { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            content: serde_json::json!({ "error": message }).to_string(),
            is_error: true,
        }
    }
}

/// Runs tools out of a [`ToolRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutor<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> ToolExecutor<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Look up `name` and run its handler on `raw_args` unchanged.
    pub async fn execute(
        &self,
        name: &str,
        raw_args: &str,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, AgentError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.execute(&ToolArguments::new(raw_args), ctx).await
    }

    /// Execute a model-issued call and encode the outcome.
    ///
    /// Never fails: lookup and handler errors become error payloads.
    pub async fn invoke(&self, call: &ToolCallRequest, ctx: &ToolContext) -> ToolOutcome {
        info!(
            tool_name = %call.name,
            arguments = %call.arguments,
            "executing tool"
        );
        let result = self.execute(&call.name, &call.arguments, ctx).await;
        let encoded = result.and_then(|value| Ok(serde_json::to_string(&value)?));
        match encoded {
            Ok(content) => ToolOutcome {
                content,
                is_error: false,
            },
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool execution error");
                ToolOutcome::failure(&err)
            }
        }
    }
}
