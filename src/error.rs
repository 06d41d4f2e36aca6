//! Error type shared by the problem model, the engine and the driver.

use std::fmt::{self, Display};

/// Errors raised while setting up an optimization run.
///
/// Both kinds are reported before the annealing loop starts. The loop
/// itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    /// A run parameter is out of range (temperatures, cooling rate,
    /// iteration counts, move weights).
    InvalidParameter(String),
    /// The problem instance is empty or its constraints admit no
    /// feasible batching.
    InvalidProblem(String),
}

impl OptimizeError {
    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub(crate) fn problem(message: impl Into<String>) -> Self {
        Self::InvalidProblem(message.into())
    }
}

impl Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::InvalidProblem(msg) => write!(f, "invalid problem: {msg}"),
        }
    }
}

impl std::error::Error for OptimizeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = OptimizeError::parameter("cooling_rate must be in (0, 1), got 1");
        assert_eq!(
            err.to_string(),
            "invalid parameter: cooling_rate must be in (0, 1), got 1"
        );
        let err = OptimizeError::problem("job list is empty");
        assert_eq!(err.to_string(), "invalid problem: job list is empty");
    }
}
