//! Finish indicators and per-run results.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::usage::Usage;

/// Why generation finished for one iteration.
///
/// Only the two values the loop can act on are modelled; anything else is
/// rejected by [`FinishReason::parse`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
}

impl FinishReason {
    /// Parse a raw finish indicator, returning `None` for unrecognized values.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

/// Outcome of a one-shot run or a single session turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnResult {
    /// Final answer text from the last iteration.
    pub content: String,
    /// Usage summed across every iteration of this run.
    pub usage: Usage,
    pub finish_reason: FinishReason,
    /// Number of iterations consumed.
    pub iterations: usize,
}
