//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::ToolDefinition;
use crate::agent::input::InputRequester;
use crate::error::AgentError;

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub tool_call_id: Option<String>,
    pub tool_name: Option<String>,
    /// Loop iteration that issued the call.
    pub iteration: usize,
    /// Present only when the tool runs inside an interactive session.
    pub input: Option<InputRequester>,
}

impl ToolContext {
    /// Ask the human driving the session for a value.
    ///
    /// Fails with [`AgentError::InputUnavailable`] in one-shot runs.
    pub async fn request_input(&self, prompt: impl Into<String>) -> Result<String, AgentError> {
        match &self.input {
            Some(requester) => {
                requester
                    .request(
                        prompt,
                        self.tool_call_id.as_deref().unwrap_or_default(),
                        self.iteration,
                    )
                    .await
            }
            None => Err(AgentError::InputUnavailable),
        }
    }
}

/// Core tool trait. Implement to create custom tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Metadata advertised to the model. `definition().name` is the registry key.
    fn definition(&self) -> &ToolDefinition;

    /// Tool name (must match what the model calls).
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Execute the tool with the raw arguments the model supplied.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, AgentError>;
}

type ToolHandler = dyn Fn(
        ToolArguments,
        ToolContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, AgentError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct FnTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    /// Create a tool from a definition and an async closure.
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(ToolArguments, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, AgentError>> + Send + 'static,
    {
        Self {
            definition,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, AgentError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.definition.name)
            .field("description", &self.definition.description)
            .finish()
    }
}
