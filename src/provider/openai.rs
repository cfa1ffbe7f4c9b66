//! Chat Completions style HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::types::{Message, Role, ToolCallRequest, Usage};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{Choice, CompletionClient, CompletionRequest, CompletionResponse, ToolSpec};

/// Completion client for OpenAI-compatible `chat/completions` endpoints.
///
/// Requests are POSTed to `api_url` as-is, so the URL must name the full
/// completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    api_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            http: shared_client().clone(),
        }
    }

    /// Build a client from a validated config.
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(&config.api_url, &config.api_key, &config.model)
            .with_temperature(config.temperature)
    }

    /// Sampling temperature; values `<= 0` are omitted from requests.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Use a caller-supplied reqwest client (custom timeouts, proxies).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body<'a>(&'a self, request: &'a CompletionRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            tools: request.tools.iter().map(WireTool::from).collect(),
            temperature: (self.temperature > 0.0).then_some(self.temperature),
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, AgentError> {
        let body = self.build_request_body(request);

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "chat completions request"
        );

        let resp = self
            .http
            .post(&self.api_url)
            .headers(bearer_headers(&self.api_key)?)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(status_to_error(status.as_u16(), &text));
        }

        let data: WireResponse = serde_json::from_str(&text)?;
        Ok(data.into())
    }
}

// Wire types (internal)

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    #[serde(skip_serializing_if = "is_blank")]
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role,
            content: &msg.content,
            tool_calls: msg.tool_calls.iter().map(WireToolCall::from).collect(),
            tool_call_id: msg.tool_call_id.as_deref(),
        }
    }
}

fn is_blank(content: &&str) -> bool {
    content.is_empty()
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ToolCallRequest> for WireToolCall {
    fn from(call: &ToolCallRequest) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

impl<'a> From<&'a ToolSpec> for WireTool<'a> {
    fn from(spec: &'a ToolSpec) -> Self {
        Self {
            kind: "function",
            function: spec,
        }
    }
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

impl From<WireResponse> for CompletionResponse {
    fn from(data: WireResponse) -> Self {
        let choices = data
            .choices
            .into_iter()
            .map(|choice| {
                let calls = choice
                    .message
                    .tool_calls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|tc| ToolCallRequest {
                        id: tc.id,
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    })
                    .collect();
                Choice {
                    finish_reason: choice.finish_reason.unwrap_or_default(),
                    message: Message::assistant_tool_calls(
                        choice.message.content.unwrap_or_default(),
                        calls,
                    ),
                }
            })
            .collect();
        Self {
            choices,
            usage: data.usage.unwrap_or_default(),
        }
    }
}
