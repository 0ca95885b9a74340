//! Cycle and per-candidate state machines.

use std::fmt;

use anyhow::{Result, bail};

/// Per-candidate restart progress.
///
/// Allowed edges:
/// `Pending -> Evicting -> AwaitingReplacement -> Recorded` and
/// `Evicting -> Recorded` when the eviction request itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateState {
    Pending,
    Evicting,
    AwaitingReplacement,
    Recorded,
}

impl CandidateState {
    pub fn can_transition_to(self, next: CandidateState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Evicting)
                | (Self::Evicting, Self::AwaitingReplacement)
                | (Self::Evicting, Self::Recorded)
                | (Self::AwaitingReplacement, Self::Recorded)
        )
    }

    pub fn transition(self, next: CandidateState) -> Result<CandidateState> {
        if !self.can_transition_to(next) {
            bail!("invalid candidate transition: {self} -> {next}");
        }
        Ok(next)
    }

    pub fn is_recorded(self) -> bool {
        self == Self::Recorded
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Evicting => "evicting",
            Self::AwaitingReplacement => "awaiting-replacement",
            Self::Recorded => "recorded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    AwaitingOperator,
    Restarting { index: usize },
    Aborted,
    Complete,
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Completed,
    /// Operator interrupted the confirmation window; nothing was touched.
    Aborted,
}
