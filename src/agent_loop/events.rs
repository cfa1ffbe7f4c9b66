//! Session event stream types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ToolCallRequest, Usage};

/// Lifecycle events emitted while a session turn runs.
///
/// Per turn the order is: one `IterationStart` per iteration, then for each
/// tool call a `ToolCall` followed by its `ToolResult` (with any `NeedInput`
/// in between), and finally exactly one `TurnComplete` or `Error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    IterationStart {
        iteration: usize,
    },
    ToolCall {
        iteration: usize,
        call: ToolCallRequest,
    },
    ToolResult {
        iteration: usize,
        tool_call_id: String,
        tool_name: String,
        content: String,
        is_error: bool,
    },
    NeedInput {
        iteration: usize,
        tool_call_id: String,
        prompt: String,
    },
    TurnComplete {
        iteration: usize,
        content: String,
        usage: Usage,
    },
    Error {
        iteration: usize,
        message: String,
    },
}

impl AgentEvent {
    /// Whether this event ends a turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TurnComplete { .. } | Self::Error { .. })
    }

    pub fn iteration(&self) -> usize {
        match self {
            Self::IterationStart { iteration }
            | Self::ToolCall { iteration, .. }
            | Self::ToolResult { iteration, .. }
            | Self::NeedInput { iteration, .. }
            | Self::TurnComplete { iteration, .. }
            | Self::Error { iteration, .. } => *iteration,
        }
    }
}

/// Envelope for streamed session events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session_id: Uuid,
    /// Monotonically increasing across the whole session, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub event: AgentEvent,
}
