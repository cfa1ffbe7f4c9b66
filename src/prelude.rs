//! Convenience re-exports for common use.

pub use crate::agent::{Agent, Session, SessionState};
pub use crate::agent_loop::{AgentEvent, SessionEvent};
pub use crate::config::AgentConfig;
pub use crate::error::{AgentError, Result};
pub use crate::provider::{ChatCompletionsClient, CompletionClient};
pub use crate::tools::{FnTool, Tool, ToolArguments, ToolContext, ToolDefinition, ToolRegistry};
pub use crate::types::{FinishReason, Message, Role, ToolCallRequest, TurnResult, Usage};
pub use tokio_util::sync::CancellationToken;
