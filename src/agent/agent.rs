//! Core Agent struct with one-shot and session entry points.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::session::Session;
use crate::agent_loop::{LoopState, TurnEngine, TurnScope};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::provider::{ChatCompletionsClient, CompletionClient};
use crate::tools::{Tool, ToolRegistry};
use crate::types::{Message, TurnResult};

/// A tool-calling agent: a completion client, a tool registry and the
/// configuration that bounds the loop.
pub struct Agent {
    config: AgentConfig,
    tools: ToolRegistry,
    client: Arc<dyn CompletionClient>,
}

impl Agent {
    /// Create an agent talking to the configured chat-completions endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Configuration`] when required setup is missing.
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let client = Arc::new(ChatCompletionsClient::from_config(&config));
        Ok(Self {
            config,
            tools: ToolRegistry::new(),
            client,
        })
    }

    /// Create an agent backed by a custom completion client.
    pub fn with_client(
        config: AgentConfig,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        Ok(Self {
            config,
            tools: ToolRegistry::new(),
            client,
        })
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub fn register_tool(&mut self, tool: impl Tool + 'static) {
        self.tools.register(tool);
    }

    /// Add a tool (builder style).
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register_tool(tool);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn engine(&self) -> TurnEngine {
        TurnEngine::new(self.client.clone(), self.tools.clone())
    }

    /// Run the loop to completion for a single prompt.
    ///
    /// The transcript starts with the configured system prompt and `prompt`
    /// as the user message.
    pub async fn run(&self, prompt: impl Into<String>) -> Result<TurnResult, AgentError> {
        let mut messages = vec![
            Message::system(&self.config.system_prompt),
            Message::user(prompt),
        ];
        self.run_messages(&mut messages).await
    }

    /// Run the loop over a caller-supplied transcript, extending it in place.
    pub async fn run_messages(
        &self,
        messages: &mut Vec<Message>,
    ) -> Result<TurnResult, AgentError> {
        info!(
            model = %self.config.model,
            tools = self.tools.len(),
            max_loops = self.config.max_loops(),
            "starting run"
        );
        let mut state = LoopState::new(self.config.max_loops());
        self.engine()
            .run(messages, &mut state, &TurnScope::detached())
            .await
    }

    /// Open an interactive session under a child of `parent`.
    ///
    /// Cancelling `parent` cancels the session. The session sees the tools
    /// registered at the time of this call.
    pub fn new_session(&self, parent: &CancellationToken) -> Session {
        Session::new(
            self.engine(),
            &self.config.system_prompt,
            self.config.max_loops(),
            parent,
        )
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .finish()
    }
}
