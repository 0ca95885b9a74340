//! Domain models and invariants.

pub mod config;
pub mod cycle;
pub mod events;
pub mod instance;
pub mod outcome;
pub mod resources;
pub mod time;

pub use config::{CycleTiming, LoggingConfig, PodcycleConfig, TimingConfig, poll_attempts};
pub use cycle::{CandidateState, CyclePhase, CycleStatus};
pub use events::CycleEvent;
pub use instance::{ClusterSnapshot, Instance, InstanceKey, InstancePhase, Readiness};
pub use outcome::{CycleReport, CycleSummary, RestartOutcome};
pub use resources::{cpu_to_millicores, memory_to_mib};
pub use time::format_age;
