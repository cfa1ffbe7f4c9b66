use crate::error::AgentError;

/// Counts loop iterations against a ceiling.
///
/// For a one-shot run the budget lives for one run; a session carries the
/// same budget across every turn of its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationBudget {
    used: usize,
    limit: usize,
}

impl IterationBudget {
    pub fn new(limit: usize) -> Self {
        Self { used: 0, limit }
    }

    /// Resume a budget that has already consumed `used` iterations.
    pub fn resume(limit: usize, used: usize) -> Self {
        Self { used, limit }
    }

    /// Claim the next iteration, failing once the ceiling is exceeded.
    ///
    /// The counter advances even on failure, matching the number of attempts.
    pub fn advance(&mut self) -> Result<usize, AgentError> {
        self.used = self.used.saturating_add(1);
        if self.used > self.limit {
            return Err(AgentError::IterationLimitExceeded { limit: self.limit });
        }
        Ok(self.used)
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }
}
