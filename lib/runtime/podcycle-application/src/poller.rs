//! Bounded readiness polling.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, warn};

use podcycle_domain::{CycleTiming, Instance, InstanceKey, Readiness, poll_attempts};
use podcycle_ports::{ClusterPort, ReplacementLocator};

/// What a poll is looking for.
#[derive(Clone, Copy)]
pub enum PollTarget<'a> {
    /// A pod whose exact name is known.
    Exact { name: &'a str },
    /// Any replacement of `evicted`, as judged by `locator`.
    Successor {
        evicted: &'a Instance,
        locator: &'a dyn ReplacementLocator,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Ready(InstanceKey),
    Completed(InstanceKey),
    TimedOut { attempts: u32 },
}

impl PollResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Completed(_))
    }
}

#[derive(Clone)]
pub struct ReadinessPoller {
    cluster: Arc<dyn ClusterPort>,
    interval: Duration,
    ready_timeout: Duration,
    successor_budget: Duration,
}

impl ReadinessPoller {
    pub fn new(cluster: Arc<dyn ClusterPort>, timing: &CycleTiming) -> Self {
        Self {
            cluster,
            interval: timing.poll_interval,
            ready_timeout: timing.ready_timeout,
            successor_budget: timing.successor_budget(),
        }
    }

    /// Query until the target is ready or completed, at most
    /// `ceil(budget / interval)` times. Sleeps between queries, not after the last.
    /// Query errors count as "not ready yet".
    pub async fn await_ready(
        &self,
        namespace: &str,
        target: PollTarget<'_>,
        budget: Duration,
    ) -> PollResult {
        let attempts = poll_attempts(budget, self.interval);
        for attempt in 1..=attempts {
            match self.probe(namespace, target).await {
                Ok(Some((key, Readiness::Ready))) => {
                    debug!(%key, attempt, "pod ready");
                    return PollResult::Ready(key);
                }
                Ok(Some((key, Readiness::Completed))) => {
                    debug!(%key, attempt, "pod completed");
                    return PollResult::Completed(key);
                }
                Ok(None) => debug!(namespace, attempt, attempts, "pod not ready yet"),
                Err(err) => warn!(namespace, attempt, error = %err, "readiness query failed"),
            }
            if attempt < attempts {
                sleep(self.interval).await;
            }
        }
        PollResult::TimedOut { attempts }
    }

    /// Wait for a pod with a known name, within `ready_timeout`.
    pub async fn await_instance(&self, namespace: &str, name: &str) -> PollResult {
        self.await_ready(namespace, PollTarget::Exact { name }, self.ready_timeout)
            .await
    }

    /// Wait for any ready replacement of `evicted`, within the successor budget.
    pub async fn await_replacement(
        &self,
        evicted: &Instance,
        locator: &dyn ReplacementLocator,
    ) -> PollResult {
        self.await_ready(
            evicted.namespace(),
            PollTarget::Successor { evicted, locator },
            self.successor_budget,
        )
        .await
    }

    async fn probe(
        &self,
        namespace: &str,
        target: PollTarget<'_>,
    ) -> Result<Option<(InstanceKey, Readiness)>> {
        match target {
            PollTarget::Exact { name } => {
                let instance = self.cluster.get_instance(namespace, name).await?;
                Ok(instance.and_then(|instance| {
                    instance
                        .readiness()
                        .map(|readiness| (instance.key.clone(), readiness))
                }))
            }
            PollTarget::Successor { evicted, locator } => {
                let observed = self.cluster.list_namespace(namespace).await?;
                Ok(observed
                    .into_iter()
                    .filter(|instance| locator.is_replacement(evicted, instance))
                    .find_map(|instance| {
                        instance
                            .readiness()
                            .map(|readiness| (instance.key.clone(), readiness))
                    }))
            }
        }
    }
}
