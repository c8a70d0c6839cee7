//! Small enums shared by the walker, the replacement coordinator, and errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which pointer a lineage step follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// Follow `predecessor()` towards the oldest token.
    Backward,
    /// Follow `successor()` towards the newest token.
    Forward,
}

impl LinkDirection {
    /// Name of the contract field this direction reads.
    pub fn pointer_name(self) -> &'static str {
        match self {
            LinkDirection::Backward => "predecessor",
            LinkDirection::Forward => "successor",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            LinkDirection::Backward => LinkDirection::Forward,
            LinkDirection::Forward => LinkDirection::Backward,
        }
    }
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkDirection::Backward => write!(f, "backward"),
            LinkDirection::Forward => write!(f, "forward"),
        }
    }
}

/// States of a single replacement attempt.
///
/// `Validating -> IntegrityChecking -> Submitting -> Done`, with `Rejected`
/// (nothing was written) and `Failed` (the write may or may not have landed)
/// as the terminal failure states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementState {
    Validating,
    IntegrityChecking,
    Submitting,
    Done,
    Rejected,
    Failed,
}

impl ReplacementState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReplacementState::Done | ReplacementState::Rejected | ReplacementState::Failed
        )
    }
}

impl fmt::Display for ReplacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementState::Validating => "validating",
            ReplacementState::IntegrityChecking => "integrity_checking",
            ReplacementState::Submitting => "submitting",
            ReplacementState::Done => "done",
            ReplacementState::Rejected => "rejected",
            ReplacementState::Failed => "failed",
        };
        f.write_str(name)
    }
}
