use crate::instance::{Instance, InstanceKey};
use crate::outcome::{CycleSummary, RestartOutcome};

/// Progress notifications emitted by the restart cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleEvent {
    CandidatesSelected {
        candidates: Vec<Instance>,
    },
    AwaitingConfirmation {
        count: usize,
        delay_secs: u64,
    },
    Aborted,
    CandidateStarted {
        position: usize,
        total: usize,
        key: InstanceKey,
    },
    Evicted {
        key: InstanceKey,
    },
    EvictionFailed {
        key: InstanceKey,
        error: String,
    },
    AwaitingReplacement {
        key: InstanceKey,
    },
    OutcomeRecorded {
        outcome: RestartOutcome,
    },
    CoolingDown {
        secs: u64,
    },
    Finished {
        summary: CycleSummary,
    },
}
