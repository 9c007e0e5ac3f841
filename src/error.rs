//! Error types for the battle engine.

use thiserror::Error;

/// Failures of an external roster source.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse roster data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("roster source has no creatures")]
    Empty,

    #[error("species {0} not found")]
    NotFound(u32),

    #[error("roster source unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by team selection and the battle reducer.
///
/// None of these leave a partially mutated battle behind: a rejected
/// selection or action returns the caller's state untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    /// Opponent data could not be fetched. Retrying may succeed.
    #[error("opponent data unavailable: {0}")]
    DataUnavailable(String),

    /// Team selection broke a size, aliveness or uniqueness rule.
    #[error("invalid team selection: {0}")]
    InvalidSelection(String),

    /// Action for a defeated combatant, out of turn, or after the battle ended.
    #[error("illegal action: {0}")]
    IllegalAction(String),
}

impl BattleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BattleError::DataUnavailable(_))
    }
}

impl From<RosterError> for BattleError {
    fn from(err: RosterError) -> Self {
        BattleError::DataUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_data_unavailable_is_retryable() {
        assert!(BattleError::from(RosterError::Empty).is_retryable());
        assert!(!BattleError::InvalidSelection("x".into()).is_retryable());
        assert!(!BattleError::IllegalAction("x".into()).is_retryable());
    }
}
