use serde::{Deserialize, Serialize};

use crate::cycle::CycleStatus;
use crate::instance::InstanceKey;

/// Result of one restart attempt. Created once per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    pub key: InstanceKey,
    pub success: bool,
    pub reason: Option<String>,
    /// The pod confirmed as the replacement, when one was found.
    pub replacement: Option<InstanceKey>,
}

impl RestartOutcome {
    pub fn succeeded(key: InstanceKey, replacement: InstanceKey) -> Self {
        Self {
            key,
            success: true,
            reason: None,
            replacement: Some(replacement),
        }
    }

    pub fn failed(key: InstanceKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            success: false,
            reason: Some(reason.into()),
            replacement: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl CycleSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a RestartOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                if outcome.success {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            })
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Everything a finished (or aborted) cycle hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub status: CycleStatus,
    pub candidates: Vec<InstanceKey>,
    pub outcomes: Vec<RestartOutcome>,
    pub summary: CycleSummary,
}

impl CycleReport {
    pub fn aborted(candidates: Vec<InstanceKey>) -> Self {
        Self {
            status: CycleStatus::Aborted,
            candidates,
            outcomes: Vec::new(),
            summary: CycleSummary::default(),
        }
    }
}
