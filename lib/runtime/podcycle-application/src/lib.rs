//! Sequential restart cycle: candidate selection, eviction, readiness polling
//! and outcome aggregation.

pub mod aggregator;
pub mod controller;
pub mod filter;
pub mod locator;
pub mod poller;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use aggregator::OutcomeLedger;
pub use controller::RestartCycle;
pub use filter::select_candidates;
pub use locator::NamePrefixLocator;
pub use poller::{PollResult, PollTarget, ReadinessPoller};
