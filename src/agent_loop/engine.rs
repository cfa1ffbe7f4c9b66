//! The think/act loop for a single turn.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::control::EventEmitter;
use super::events::AgentEvent;
use super::limits::IterationBudget;
use crate::agent::input::InputRequester;
use crate::error::AgentError;
use crate::provider::{CompletionClient, CompletionRequest};
use crate::tools::{ToolContext, ToolExecutor, ToolRegistry};
use crate::types::{FinishReason, Message, TurnResult, Usage};

/// Counters owned by whoever drives the engine.
///
/// A one-shot run starts these fresh; a session carries them across turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    pub budget: IterationBudget,
    /// Cumulative usage across every completion call made under this state.
    pub usage: Usage,
}

impl LoopState {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            budget: IterationBudget::new(max_iterations),
            usage: Usage::default(),
        }
    }
}

/// Per-turn wiring: where events go, what cancels the turn, and how tools
/// reach the human.
#[derive(Debug, Clone, Default)]
pub struct TurnScope {
    pub events: EventEmitter,
    pub cancel: CancellationToken,
    pub input: Option<InputRequester>,
}

impl TurnScope {
    /// No events, no input channel, never cancelled.
    pub fn detached() -> Self {
        Self::default()
    }
}

/// Alternates model calls and tool execution until the model stops.
#[derive(Clone)]
pub struct TurnEngine {
    client: Arc<dyn CompletionClient>,
    tools: ToolRegistry,
}

impl TurnEngine {
    pub fn new(client: Arc<dyn CompletionClient>, tools: ToolRegistry) -> Self {
        Self { client, tools }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Drive `messages` forward until the model finishes with `stop`.
    ///
    /// The transcript is extended in place: an assistant message (with its
    /// tool calls) plus one tool message per call for every tool iteration,
    /// and the final assistant message on success. On failure the transcript
    /// holds whatever was appended before the error; callers decide whether
    /// to keep it.
    pub async fn run(
        &self,
        messages: &mut Vec<Message>,
        state: &mut LoopState,
        scope: &TurnScope,
    ) -> Result<TurnResult, AgentError> {
        let tool_specs = self.tools.schemas();
        let executor = ToolExecutor::new(&self.tools);
        let mut turn_usage = Usage::default();
        let mut turn_iterations = 0usize;

        loop {
            if scope.cancel.is_cancelled() {
                debug!(iteration = state.budget.used(), "turn cancelled before next iteration");
                return Err(AgentError::ContextCancelled);
            }
            let limit = state.budget.limit();
            let iteration = state.budget.advance().map_err(|err| {
                error!(limit, error = %err, "iteration limit reached");
                err
            })?;
            turn_iterations += 1;

            info!(iteration, messages = messages.len(), "starting iteration");
            scope
                .events
                .emit(AgentEvent::IterationStart { iteration })
                .await;

            let request = CompletionRequest {
                messages: messages.clone(),
                tools: tool_specs.clone(),
            };
            let response = tokio::select! {
                biased;
                _ = scope.cancel.cancelled() => {
                    debug!(iteration, "turn cancelled while awaiting completion");
                    return Err(AgentError::ContextCancelled);
                }
                response = self.client.complete(&request) => response.map_err(|err| {
                    error!(iteration, error = %err, "completion request failed");
                    err
                })?,
            };

            state.usage.merge(&response.usage);
            turn_usage.merge(&response.usage);

            let Some(choice) = response.choices.into_iter().next() else {
                error!(iteration, "completion response contained no choices");
                return Err(AgentError::EmptyResponse);
            };

            info!(
                iteration,
                finish_reason = %choice.finish_reason,
                tool_calls = choice.message.tool_calls.len(),
                "received response"
            );

            match FinishReason::parse(&choice.finish_reason) {
                Some(FinishReason::ToolCalls) => {
                    let calls = choice.message.tool_calls;
                    messages.push(Message::assistant_tool_calls(
                        choice.message.content,
                        calls.clone(),
                    ));

                    for call in calls {
                        scope
                            .events
                            .emit(AgentEvent::ToolCall {
                                iteration,
                                call: call.clone(),
                            })
                            .await;

                        let ctx = ToolContext {
                            tool_call_id: Some(call.id.clone()),
                            tool_name: Some(call.name.clone()),
                            iteration,
                            input: scope.input.clone(),
                        };
                        let outcome = executor.invoke(&call, &ctx).await;

                        scope
                            .events
                            .emit(AgentEvent::ToolResult {
                                iteration,
                                tool_call_id: call.id.clone(),
                                tool_name: call.name.clone(),
                                content: outcome.content.clone(),
                                is_error: outcome.is_error,
                            })
                            .await;
                        messages.push(Message::tool(call.id, outcome.content));
                    }
                }
                Some(FinishReason::Stop) => {
                    let content = choice.message.content;
                    messages.push(Message::assistant(content.clone()));
                    info!(
                        iteration,
                        turn_iterations,
                        total_tokens = turn_usage.total_tokens,
                        "turn complete"
                    );
                    return Ok(TurnResult {
                        content,
                        usage: turn_usage,
                        finish_reason: FinishReason::Stop,
                        iterations: turn_iterations,
                    });
                }
                None => {
                    error!(
                        iteration,
                        finish_reason = %choice.finish_reason,
                        "unrecognized finish reason"
                    );
                    return Err(AgentError::UnrecognizedFinishReason(choice.finish_reason));
                }
            }
        }
    }
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("tools", &self.tools.names())
            .finish()
    }
}
