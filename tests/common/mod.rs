//! Shared test helpers and scripted completion client.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use agentloop::agent::Agent;
use agentloop::agent_loop::SessionEvent;
use agentloop::config::AgentConfig;
use agentloop::error::AgentError;
use agentloop::provider::{Choice, CompletionClient, CompletionRequest, CompletionResponse};
use agentloop::tools::{FnTool, ToolDefinition};
use agentloop::types::*;

enum Step {
    Respond(CompletionResponse),
    Fail(AgentError),
    Hang,
}

/// A completion client that plays back a queued script.
///
/// Once the script is exhausted it repeats the `fallback` response if one is
/// set, and otherwise fails with an API error.
#[derive(Default)]
pub struct ScriptedClient {
    script: std::sync::Mutex<VecDeque<Step>>,
    fallback: std::sync::Mutex<Option<CompletionResponse>>,
    requests: std::sync::Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response requesting the given `(id, name, arguments)` calls.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, &str)], usage: Usage) {
        self.push(Step::Respond(tool_calls_response(calls, usage)));
    }

    /// Queue a final answer.
    pub fn queue_stop(&self, text: &str, usage: Usage) {
        self.push(Step::Respond(response("stop", text, vec![], usage)));
    }

    /// Queue a response with an arbitrary finish indicator.
    pub fn queue_finish(&self, finish_reason: &str, text: &str) {
        self.push(Step::Respond(response(finish_reason, text, vec![], Usage::default())));
    }

    pub fn queue_response(&self, resp: CompletionResponse) {
        self.push(Step::Respond(resp));
    }

    pub fn queue_error(&self, err: AgentError) {
        self.push(Step::Fail(err));
    }

    /// Queue a call that never completes.
    pub fn queue_hang(&self) {
        self.push(Step::Hang);
    }

    /// Keep requesting the same tool call forever once the script runs out.
    pub fn always_tool_calls(&self, id: &str, name: &str, arguments: &str) {
        *self.fallback.lock().unwrap() = Some(tool_calls_response(
            &[(id, name, arguments)],
            Usage::new(1, 1, 2),
        ));
    }

    /// Number of completion calls received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AgentError> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(resp)) => Ok(resp),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hang) => std::future::pending().await,
            None => match self.fallback.lock().unwrap().clone() {
                Some(resp) => Ok(resp),
                None => Err(AgentError::api(500, "script exhausted")),
            },
        }
    }
}

pub fn response(
    finish_reason: &str,
    text: &str,
    calls: Vec<ToolCallRequest>,
    usage: Usage,
) -> CompletionResponse {
    CompletionResponse {
        choices: vec![Choice {
            finish_reason: finish_reason.to_string(),
            message: Message::assistant_tool_calls(text, calls),
        }],
        usage,
    }
}

pub fn tool_calls_response(calls: &[(&str, &str, &str)], usage: Usage) -> CompletionResponse {
    let calls = calls
        .iter()
        .map(|(id, name, args)| ToolCallRequest::new(*id, *name, *args))
        .collect();
    response("tool_calls", "", calls, usage)
}

pub fn test_config(max_loops: usize) -> AgentConfig {
    AgentConfig::builder()
        .api_key("sk-test")
        .api_url("http://localhost/v1/chat/completions")
        .model("test-model")
        .system_prompt("You are a test assistant.")
        .max_loops(max_loops)
        .build()
}

/// Echoes its `text` argument back.
pub fn echo_tool() -> FnTool {
    FnTool::new(
        ToolDefinition::new("echo", "Echo the text back").string("text", "Text to echo", true),
        |args, _ctx| async move { Ok(serde_json::json!(args.get_str("text")?)) },
    )
}

/// Always fails with a tool execution error.
pub fn failing_tool() -> FnTool {
    FnTool::new(
        ToolDefinition::new("fail", "Always fails"),
        |_args, _ctx| async move { Err(AgentError::tool("fail", "boom")) },
    )
}

/// Asks the human for a name and greets them.
pub fn ask_name_tool() -> FnTool {
    FnTool::new(
        ToolDefinition::new("ask_name", "Ask the user for their name"),
        |_args, ctx| async move {
            let name = ctx.request_input("What is your name?").await?;
            Ok(serde_json::json!(format!("Hello, {name}")))
        },
    )
}

pub fn agent_with(client: Arc<ScriptedClient>, max_loops: usize) -> Agent {
    Agent::with_client(test_config(max_loops), client)
        .unwrap()
        .with_tool(echo_tool())
        .with_tool(failing_tool())
        .with_tool(ask_name_tool())
}

/// Receive events until the turn ends, failing the test after a timeout.
pub async fn collect_turn(rx: &mut mpsc::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    loop {
        let evt = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for session event")
            .expect("event stream closed before the turn ended");
        let terminal = evt.event.is_terminal();
        events.push(evt);
        if terminal {
            return events;
        }
    }
}
