use std::sync::Arc;
use std::time::Duration;

use podcycle_application::testkit::SimulatedCluster;
use podcycle_application::{NamePrefixLocator, RestartCycle};
use podcycle_domain::{
    CycleEvent, CycleStatus, CycleTiming, Instance, InstanceKey, InstancePhase,
};
use podcycle_ports::{InMemoryProgressPort, PortSet};

fn running(namespace: &str, name: &str) -> Instance {
    Instance::new(InstanceKey::new(namespace, name), InstancePhase::Running)
        .with_containers([true])
        .with_uid(format!("uid-{name}"))
}

fn cycle(cluster: &Arc<SimulatedCluster>, progress: &InMemoryProgressPort) -> RestartCycle {
    let ports = PortSet::new(
        cluster.clone(),
        Arc::new(NamePrefixLocator),
        Arc::new(progress.clone()),
    );
    RestartCycle::new(ports, CycleTiming::default(), ["kube-system".to_string()])
}

async fn never() {
    std::future::pending::<()>().await
}

#[tokio::test(start_paused = true)]
async fn test_restarts_unprotected_pods_in_order() {
    let cluster = Arc::new(SimulatedCluster::new(vec![
        running("app", "web-7d9f-a1b2c"),
        running("app", "api-55c4-x9y8z"),
        running("kube-system", "coredns-66bf-q2w3e"),
    ]));
    let progress = InMemoryProgressPort::default();
    let started = tokio::time::Instant::now();

    let report = cycle(&cluster, &progress).run(never()).await.unwrap();

    assert_eq!(report.status, CycleStatus::Completed);
    assert_eq!(
        report.candidates,
        vec![
            InstanceKey::new("app", "web-7d9f-a1b2c"),
            InstanceKey::new("app", "api-55c4-x9y8z"),
        ]
    );
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|outcome| outcome.success));
    assert_eq!(
        report.outcomes[0].replacement,
        Some(InstanceKey::new("app", "web-7d9f-r1"))
    );
    assert_eq!(
        report.outcomes[1].replacement,
        Some(InstanceKey::new("app", "api-55c4-r2"))
    );
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(cluster.deletes(), report.candidates);

    // confirm + grace + cooldown + grace
    assert_eq!(started.elapsed(), Duration::from_secs(45));

    let events = progress.drain_events();
    assert!(matches!(
        events.first(),
        Some(CycleEvent::CandidatesSelected { candidates }) if candidates.len() == 2
    ));
    assert_eq!(
        events.last(),
        Some(&CycleEvent::Finished {
            summary: report.summary
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_replacements_and_failed_eviction() {
    let cluster = Arc::new(
        SimulatedCluster::new(vec![
            running("app", "web-7d9f-a1b2c"),
            running("app", "api-55c4-x9y8z"),
            running("app", "worker-8f2a-k4l5m"),
        ])
        .fail_delete(InstanceKey::new("app", "api-55c4-x9y8z"))
        .replacements_ready_after(3),
    );
    let progress = InMemoryProgressPort::default();

    let report = cycle(&cluster, &progress).run(never()).await.unwrap();

    let results: Vec<_> = report.outcomes.iter().map(|outcome| outcome.success).collect();
    assert_eq!(results, [true, false, true]);
    assert!(
        report.outcomes[1]
            .reason
            .as_deref()
            .unwrap_or_default()
            .starts_with("eviction failed")
    );
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(cluster.deletes().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_operator_interrupt_leaves_cluster_untouched() {
    let cluster = Arc::new(SimulatedCluster::new(vec![running("app", "web-7d9f-a1b2c")]));
    let progress = InMemoryProgressPort::default();

    let interrupt = tokio::time::sleep(Duration::from_secs(3));
    let report = cycle(&cluster, &progress).run(interrupt).await.unwrap();

    assert_eq!(report.status, CycleStatus::Aborted);
    assert!(report.outcomes.is_empty());
    assert!(cluster.deletes().is_empty());
    assert!(progress.drain_events().contains(&CycleEvent::Aborted));
}

#[tokio::test(start_paused = true)]
async fn test_only_protected_pods_means_nothing_to_do() {
    let cluster = Arc::new(SimulatedCluster::new(vec![running(
        "kube-system",
        "coredns-66bf-q2w3e",
    )]));
    let progress = InMemoryProgressPort::default();
    let started = tokio::time::Instant::now();

    let report = cycle(&cluster, &progress).run(never()).await.unwrap();

    assert_eq!(report.status, CycleStatus::Completed);
    assert_eq!(report.summary.total, 0);
    assert!(cluster.deletes().is_empty());
    assert_eq!(started.elapsed(), Duration::ZERO);
}
