//! Error classification used to route failures through the turn loop.

/// Broad error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or invalid setup, reported before any loop runs.
    Configuration,
    /// Network, HTTP status or decode failures from the completion client.
    Transport,
    /// Tool lookup or handler failures.
    Tool,
    /// The iteration ceiling was exceeded.
    IterationLimit,
    /// The model replied with a finish indicator the loop cannot act on.
    Protocol,
    /// Operations on a closed, cancelled or busy session.
    Session,
}

impl ErrorCategory {
    /// Tool failures are fed back to the model; everything else ends the turn.
    pub fn is_fatal_to_turn(self) -> bool {
        !matches!(self, Self::Tool)
    }
}
