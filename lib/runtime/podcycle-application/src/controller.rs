//! Sequential restart cycle.
//!
//! One candidate at a time: evict, wait the grace period, poll for a ready
//! replacement, record the outcome, cool down. Candidate `k + 1` is never
//! started before candidate `k` reaches [`CandidateState::Recorded`].

use std::collections::BTreeSet;
use std::future::Future;

use anyhow::{Context, Result, ensure};
use tokio::time::sleep;
use tracing::{info, warn};

use podcycle_domain::{
    CandidateState, CycleEvent, CyclePhase, CycleReport, CycleStatus, CycleTiming, Instance,
    InstanceKey, RestartOutcome,
};
use podcycle_ports::PortSet;

use crate::aggregator::OutcomeLedger;
use crate::filter::select_candidates;
use crate::poller::{PollResult, ReadinessPoller};

pub struct RestartCycle {
    ports: PortSet,
    timing: CycleTiming,
    protected: BTreeSet<String>,
    poller: ReadinessPoller,
    phase: CyclePhase,
}

impl RestartCycle {
    pub fn new(
        ports: PortSet,
        timing: CycleTiming,
        protected: impl IntoIterator<Item = String>,
    ) -> Self {
        let poller = ReadinessPoller::new(ports.cluster.clone(), &timing);
        Self {
            ports,
            timing,
            protected: protected.into_iter().collect(),
            poller,
            phase: CyclePhase::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run a full cycle.
    ///
    /// `interrupt` is raced against the confirmation delay only; once it has
    /// elapsed the cycle runs to completion. Fails only when the initial pod
    /// listing fails.
    pub async fn run<F>(&mut self, interrupt: F) -> Result<CycleReport>
    where
        F: Future<Output = ()>,
    {
        let snapshot = self
            .ports
            .cluster
            .list_instances()
            .await
            .context("failed to list pods across all namespaces")?;

        let candidates = select_candidates(&snapshot, &self.protected);
        let keys: Vec<_> = candidates.iter().map(|c| c.key.clone()).collect();
        info!(
            pods = snapshot.len(),
            candidates = candidates.len(),
            "selected restart candidates"
        );
        self.publish(CycleEvent::CandidatesSelected {
            candidates: candidates.clone(),
        });

        if candidates.is_empty() {
            return Ok(self.finish(keys, OutcomeLedger::default()));
        }

        self.phase = CyclePhase::AwaitingOperator;
        self.publish(CycleEvent::AwaitingConfirmation {
            count: candidates.len(),
            delay_secs: self.timing.confirm_delay.as_secs(),
        });
        if !self.confirm(interrupt).await {
            warn!("restart cycle cancelled by operator before any eviction");
            self.phase = CyclePhase::Aborted;
            self.publish(CycleEvent::Aborted);
            return Ok(CycleReport::aborted(keys));
        }

        let total = candidates.len();
        let mut ledger = OutcomeLedger::default();
        let mut previous: Option<CandidateState> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if let Some(state) = previous {
                ensure!(
                    state.is_recorded(),
                    "candidate {index} started while the previous one was {state}"
                );
            }
            self.phase = CyclePhase::Restarting { index };
            self.publish(CycleEvent::CandidateStarted {
                position: index + 1,
                total,
                key: candidate.key.clone(),
            });

            let mut state = CandidateState::Pending;
            let outcome = self.restart_one(candidate, &mut state).await?;
            if outcome.success {
                info!(key = %outcome.key, "pod restarted");
            } else {
                warn!(
                    key = %outcome.key,
                    reason = outcome.reason.as_deref().unwrap_or_default(),
                    "pod restart failed"
                );
            }
            self.publish(CycleEvent::OutcomeRecorded {
                outcome: outcome.clone(),
            });
            ledger.record(outcome);
            previous = Some(state);

            if index + 1 < total {
                self.publish(CycleEvent::CoolingDown {
                    secs: self.timing.cooldown.as_secs(),
                });
                sleep(self.timing.cooldown).await;
            }
        }

        Ok(self.finish(keys, ledger))
    }

    async fn confirm<F>(&self, interrupt: F) -> bool
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = interrupt => false,
            _ = sleep(self.timing.confirm_delay) => true,
        }
    }

    async fn restart_one(
        &self,
        candidate: &Instance,
        state: &mut CandidateState,
    ) -> Result<RestartOutcome> {
        let key = &candidate.key;
        *state = state.transition(CandidateState::Evicting)?;
        if let Err(err) = self
            .ports
            .cluster
            .delete_instance(&key.namespace, &key.name)
            .await
        {
            let error = format!("{err:#}");
            self.publish(CycleEvent::EvictionFailed {
                key: key.clone(),
                error: error.clone(),
            });
            *state = state.transition(CandidateState::Recorded)?;
            return Ok(RestartOutcome::failed(
                key.clone(),
                format!("eviction failed: {error}"),
            ));
        }
        self.publish(CycleEvent::Evicted { key: key.clone() });

        sleep(self.timing.grace_period).await;

        *state = state.transition(CandidateState::AwaitingReplacement)?;
        self.publish(CycleEvent::AwaitingReplacement { key: key.clone() });
        let result = self
            .poller
            .await_replacement(candidate, self.ports.locator.as_ref())
            .await;

        *state = state.transition(CandidateState::Recorded)?;
        Ok(match result {
            PollResult::Ready(replacement) | PollResult::Completed(replacement) => {
                RestartOutcome::succeeded(key.clone(), replacement)
            }
            PollResult::TimedOut { attempts } => RestartOutcome::failed(
                key.clone(),
                format!("no ready replacement after {attempts} checks"),
            ),
        })
    }

    fn finish(&mut self, candidates: Vec<InstanceKey>, ledger: OutcomeLedger) -> CycleReport {
        let summary = ledger.summarize();
        self.phase = CyclePhase::Complete;
        self.publish(CycleEvent::Finished { summary });
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "restart cycle complete"
        );
        CycleReport {
            status: CycleStatus::Completed,
            candidates,
            outcomes: ledger.into_outcomes(),
            summary,
        }
    }

    fn publish(&self, event: CycleEvent) {
        self.ports.progress.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use podcycle_domain::InstancePhase;
    use podcycle_ports::{InMemoryProgressPort, NullProgressPort};

    use crate::locator::NamePrefixLocator;
    use crate::testkit::SimulatedCluster;

    fn pod(namespace: &str, name: &str) -> Instance {
        Instance::new(InstanceKey::new(namespace, name), InstancePhase::Running)
            .with_containers([true])
    }

    fn cycle(cluster: &Arc<SimulatedCluster>, progress: Arc<InMemoryProgressPort>) -> RestartCycle {
        let ports = PortSet::new(cluster.clone(), Arc::new(NamePrefixLocator), progress);
        RestartCycle::new(
            ports,
            CycleTiming::default(),
            ["kube-system".to_string()],
        )
    }

    fn never() -> std::future::Pending<()> {
        std::future::pending()
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarts_candidates_in_order() {
        let cluster = Arc::new(
            SimulatedCluster::new(vec![
                pod("app", "web-7d9f-aaaaa"),
                pod("app", "api-55c4-bbbbb"),
                pod("kube-system", "coredns-1234-ccccc"),
            ])
            .replacements_ready_after(2),
        );
        let progress = Arc::new(InMemoryProgressPort::default());
        let mut cycle = cycle(&cluster, progress.clone());

        let report = cycle.run(never()).await.unwrap();

        assert_eq!(report.status, CycleStatus::Completed);
        assert_eq!(
            report.candidates,
            vec![
                InstanceKey::new("app", "web-7d9f-aaaaa"),
                InstanceKey::new("app", "api-55c4-bbbbb"),
            ]
        );
        assert_eq!(
            cluster.deletes(),
            vec![
                InstanceKey::new("app", "web-7d9f-aaaaa"),
                InstanceKey::new("app", "api-55c4-bbbbb"),
            ]
        );
        assert!(report.outcomes.iter().all(|outcome| outcome.success));
        assert_eq!(
            report.outcomes[0].replacement,
            Some(InstanceKey::new("app", "web-7d9f-r1"))
        );
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(cycle.phase(), CyclePhase::Complete);

        let events = progress.drain_events();
        assert!(matches!(events.first(), Some(CycleEvent::CandidatesSelected { candidates }) if candidates.len() == 2));
        assert!(matches!(events.last(), Some(CycleEvent::Finished { .. })));
        let cooldowns = events
            .iter()
            .filter(|event| matches!(event, CycleEvent::CoolingDown { .. }))
            .count();
        assert_eq!(cooldowns, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_failure_does_not_stop_cycle() {
        let failing = InstanceKey::new("app", "web-7d9f-aaaaa");
        let cluster = Arc::new(
            SimulatedCluster::new(vec![
                pod("app", "web-7d9f-aaaaa"),
                pod("app", "api-55c4-bbbbb"),
            ])
            .fail_delete(failing.clone()),
        );
        let progress = Arc::new(InMemoryProgressPort::default());

        let report = cycle(&cluster, progress.clone()).run(never()).await.unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].key, failing);
        assert!(!report.outcomes[0].success);
        assert!(
            report.outcomes[0]
                .reason
                .as_deref()
                .unwrap()
                .starts_with("eviction failed")
        );
        assert!(report.outcomes[1].success);
        assert_eq!(cluster.deletes().len(), 2);
        assert!(progress
            .drain_events()
            .iter()
            .any(|event| matches!(event, CycleEvent::EvictionFailed { key, .. } if *key == failing)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_replacement_times_out_and_continues() {
        let unmanaged = InstanceKey::new("app", "static-pod");
        let cluster = Arc::new(
            SimulatedCluster::new(vec![pod("app", "static-pod"), pod("app", "web-7d9f-aaaaa")])
                .unmanaged(unmanaged.clone()),
        );
        let started = tokio::time::Instant::now();

        let report = cycle(&cluster, Arc::new(InMemoryProgressPort::default()))
            .run(never())
            .await
            .unwrap();

        assert!(!report.outcomes[0].success);
        assert_eq!(
            report.outcomes[0].reason.as_deref(),
            Some("no ready replacement after 30 checks")
        );
        assert!(report.outcomes[1].success);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.succeeded, 1);
        // confirm 10 + grace 10 + 29 poll sleeps + cooldown 15 + grace 10
        assert_eq!(
            started.elapsed(),
            Duration::from_secs(10 + 10 + 29 * 5 + 15 + 10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_confirmation_touches_nothing() {
        let cluster = Arc::new(SimulatedCluster::new(vec![pod("app", "web-7d9f-aaaaa")]));
        let progress = Arc::new(InMemoryProgressPort::default());
        let mut cycle = cycle(&cluster, progress.clone());

        let report = cycle
            .run(tokio::time::sleep(Duration::from_secs(3)))
            .await
            .unwrap();

        assert_eq!(report.status, CycleStatus::Aborted);
        assert_eq!(report.candidates.len(), 1);
        assert!(report.outcomes.is_empty());
        assert!(cluster.deletes().is_empty());
        assert_eq!(cycle.phase(), CyclePhase::Aborted);
        assert!(progress.drain_events().contains(&CycleEvent::Aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_failure_is_fatal() {
        let cluster = Arc::new(SimulatedCluster::new(Vec::new()).fail_snapshot("unauthorized"));
        let ports = PortSet::new(
            cluster.clone(),
            Arc::new(NamePrefixLocator),
            Arc::new(NullProgressPort),
        );

        let err = RestartCycle::new(ports, CycleTiming::default(), Vec::new())
            .run(never())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("unauthorized"));
        assert!(cluster.deletes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_candidates_skips_confirmation() {
        let cluster = Arc::new(SimulatedCluster::new(vec![pod(
            "kube-system",
            "coredns-1234-ccccc",
        )]));
        let started = tokio::time::Instant::now();

        let report = cycle(&cluster, Arc::new(InMemoryProgressPort::default()))
            .run(never())
            .await
            .unwrap();

        assert_eq!(report.status, CycleStatus::Completed);
        assert!(report.candidates.is_empty());
        assert_eq!(report.summary.total, 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
