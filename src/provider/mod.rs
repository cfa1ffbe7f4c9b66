//! Completion client trait and the chat-completions implementation.

pub mod http;
pub mod openai;

pub use openai::ChatCompletionsClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::types::{Message, Usage};

/// A request sent to the completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full ordered transcript.
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
}

/// Tool schema in the declarative form sent to the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One candidate reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Raw finish indicator as reported by the endpoint.
    pub finish_reason: String,
    pub message: Message,
}

/// Response from the completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

/// Returns a single model response for the current transcript.
///
/// Implementations own transport concerns (timeouts, credentials). Any error
/// returned here is fatal to the turn that issued the call.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, AgentError>;
}
