//! One-shot run tests against a scripted completion client.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use agentloop::agent::Agent;
use agentloop::agent_loop::{LoopState, TurnEngine, TurnScope};
use agentloop::error::AgentError;
use agentloop::provider::CompletionResponse;
use agentloop::tools::{FnTool, ToolDefinition};
use agentloop::types::*;
use common::*;

#[tokio::test]
async fn echo_three_times_then_stop() {
    let client = ScriptedClient::new();
    for (i, word) in ["one", "two", "three"].iter().enumerate() {
        let id = format!("call_{i}");
        let args = format!(r#"{{"text":"{word}"}}"#);
        client.queue_tool_calls(&[(id.as_str(), "echo", args.as_str())], Usage::new(10, 2, 12));
    }
    client.queue_stop("one two three", Usage::new(20, 5, 25));
    let agent = agent_with(client.clone(), 10);

    let mut messages = vec![Message::system("sys"), Message::user("echo three words")];
    let result = agent.run_messages(&mut messages).await.unwrap();

    assert_eq!(result.iterations, 4);
    assert_eq!(result.content, "one two three");
    assert_eq!(result.finish_reason, FinishReason::Stop);
    assert_eq!(messages.len(), 9);
    assert_eq!(messages[3], Message::tool("call_0", "\"one\""));
    assert_eq!(messages[8], Message::assistant("one two three"));
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn run_seeds_system_and_user_messages() {
    let client = ScriptedClient::new();
    client.queue_stop("hi", Usage::default());
    let agent = agent_with(client.clone(), 5);

    agent.run("hello").await.unwrap();

    let first = &client.requests()[0];
    assert_eq!(
        first.messages,
        vec![Message::system("You are a test assistant."), Message::user("hello")]
    );
    let mut names: Vec<_> = first.tools.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["ask_name", "echo", "fail"]);
}

#[tokio::test]
async fn ceiling_of_one_fails_on_second_attempt() {
    let client = ScriptedClient::new();
    client.always_tool_calls("call_1", "echo", r#"{"text":"again"}"#);
    let agent = agent_with(client.clone(), 1);

    let err = agent.run("loop forever").await.unwrap_err();

    assert!(matches!(err, AgentError::IterationLimitExceeded { limit: 1 }));
    assert_eq!(err.to_string(), "maximum loop iterations (1) exceeded");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn ceiling_k_allows_exactly_k_calls() {
    let client = ScriptedClient::new();
    client.always_tool_calls("call_1", "echo", r#"{"text":"again"}"#);
    let agent = agent_with(client.clone(), 3);

    let err = agent.run("loop forever").await.unwrap_err();

    assert!(matches!(err, AgentError::IterationLimitExceeded { limit: 3 }));
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn usage_is_summed_across_iterations() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(&[("c1", "echo", r#"{"text":"a"}"#)], Usage::new(10, 5, 15));
    client.queue_tool_calls(&[("c2", "echo", r#"{"text":"b"}"#)], Usage::new(12, 6, 18));
    client.queue_stop("done", Usage::new(7, 3, 10));
    let agent = agent_with(client, 10);

    let result = agent.run("go").await.unwrap();

    assert_eq!(result.usage, Usage::new(29, 14, 43));
}

#[tokio::test]
async fn failing_tool_does_not_abort_the_loop() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(&[("c1", "fail", "{}")], Usage::default());
    client.queue_stop("recovered", Usage::default());
    let agent = agent_with(client.clone(), 10);

    let mut messages = vec![Message::system("sys"), Message::user("try it")];
    let result = agent.run_messages(&mut messages).await.unwrap();

    assert_eq!(result.content, "recovered");
    assert_eq!(
        messages[3],
        Message::tool("c1", r#"{"error":"boom"}"#)
    );
    // The failure was visible to the model on the next call.
    assert_eq!(client.requests()[1].messages[3].content, messages[3].content);
}

#[tokio::test]
async fn unknown_tool_becomes_error_result() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(&[("c1", "nope", "{}")], Usage::default());
    client.queue_stop("ok", Usage::default());
    let agent = agent_with(client, 10);

    let mut messages = vec![Message::system("sys"), Message::user("call nope")];
    agent.run_messages(&mut messages).await.unwrap();

    assert_eq!(messages[3].content, r#"{"error":"tool not found: nope"}"#);
}

#[tokio::test]
async fn input_requests_fail_outside_sessions() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(&[("c1", "ask_name", "{}")], Usage::default());
    client.queue_stop("ok", Usage::default());
    let agent = agent_with(client, 10);

    let mut messages = vec![Message::system("sys"), Message::user("who am i")];
    agent.run_messages(&mut messages).await.unwrap();

    let payload: serde_json::Value = serde_json::from_str(&messages[3].content).unwrap();
    assert_eq!(
        payload["error"],
        "human input is not available outside an interactive session"
    );
}

#[tokio::test]
async fn multiple_calls_produce_results_in_order() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(
        &[
            ("c1", "echo", r#"{"text":"a"}"#),
            ("c2", "fail", "{}"),
            ("c3", "echo", r#"{"text":"c"}"#),
        ],
        Usage::default(),
    );
    client.queue_stop("done", Usage::default());
    let agent = agent_with(client, 10);

    let mut messages = vec![Message::system("sys"), Message::user("three at once")];
    agent.run_messages(&mut messages).await.unwrap();

    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].tool_calls.len(), 3);
    let tool_ids: Vec<_> = messages[3..6]
        .iter()
        .map(|m| (m.role, m.tool_call_id.clone().unwrap()))
        .collect();
    assert_eq!(
        tool_ids,
        vec![
            (Role::Tool, "c1".to_string()),
            (Role::Tool, "c2".to_string()),
            (Role::Tool, "c3".to_string()),
        ]
    );
    assert_eq!(messages[5].content, "\"c\"");
    assert_eq!(messages.len(), 7);
}

#[tokio::test]
async fn unrecognized_finish_reason_is_fatal() {
    let client = ScriptedClient::new();
    client.queue_finish("length", "truncated");
    let agent = agent_with(client, 10);

    let err = agent.run("write a novel").await.unwrap_err();

    assert!(matches!(err, AgentError::UnrecognizedFinishReason(ref r) if r == "length"));
    assert!(err.is_fatal_to_turn());
}

#[tokio::test]
async fn transport_failure_aborts_without_retry() {
    let client = ScriptedClient::new();
    client.queue_error(AgentError::api(503, "overloaded"));
    client.queue_stop("never reached", Usage::default());
    let agent = agent_with(client.clone(), 10);

    let err = agent.run("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::Api { status: 503, .. }));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn cancelled_scope_stops_before_the_next_iteration() {
    let client = ScriptedClient::new();
    client.queue_stop("never reached", Usage::default());
    let engine = TurnEngine::new(client.clone(), agent_with(client.clone(), 10).tools().clone());
    let scope = TurnScope::detached();
    scope.cancel.cancel();
    let mut messages = vec![Message::user("hello")];
    let mut state = LoopState::new(10);

    let err = engine.run(&mut messages, &mut state, &scope).await.unwrap_err();

    assert!(matches!(err, AgentError::ContextCancelled));
    assert_eq!(state.budget.used(), 0);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn empty_choices_are_fatal() {
    let client = ScriptedClient::new();
    client.queue_response(CompletionResponse {
        choices: vec![],
        usage: Usage::new(1, 0, 1),
    });
    let agent = agent_with(client, 10);

    let err = agent.run("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::EmptyResponse));
}

#[tokio::test]
async fn last_registration_wins() {
    let client = ScriptedClient::new();
    client.queue_tool_calls(&[("c1", "echo", r#"{"text":"x"}"#)], Usage::default());
    client.queue_stop("done", Usage::default());
    let mut agent = agent_with(client, 10);
    agent.register_tool(FnTool::new(
        ToolDefinition::new("echo", "Shout the text back").string("text", "Text", true),
        |args, _ctx| async move { Ok(serde_json::json!(args.get_str("text")?.to_uppercase())) },
    ));
    assert_eq!(agent.tools().len(), 3);

    let mut messages = vec![Message::system("sys"), Message::user("shout")];
    agent.run_messages(&mut messages).await.unwrap();

    assert_eq!(messages[3].content, "\"X\"");
}

#[test]
fn agent_rejects_missing_configuration() {
    let mut config = test_config(5);
    config.model = String::new();
    let err = Agent::with_client(config, Arc::new(ScriptedClient::default())).unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: model is required");
}
