use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use podcycle_adapter_kube::{KubeClusterPort, KubeReports, connect};
use podcycle_application::{NamePrefixLocator, RestartCycle};
use podcycle_domain::{CycleStatus, CycleTiming, PodcycleConfig};
use podcycle_ports::PortSet;

use crate::output;
use crate::progress::TerminalProgressPort;

pub async fn restart(config: &PodcycleConfig) -> Result<()> {
    println!("WARNING: this restarts every pod outside the protected namespaces.");
    println!(
        "Protected namespaces: {}",
        config.protected_namespaces.join(", ")
    );
    println!("{}", "=".repeat(60));

    let client = connect(&config.kubeconfig_paths).await?;
    let ports = PortSet::new(
        Arc::new(KubeClusterPort::new(client)),
        Arc::new(NamePrefixLocator),
        Arc::new(TerminalProgressPort),
    );
    let mut cycle = RestartCycle::new(
        ports,
        CycleTiming::from(&config.timing),
        config.protected_namespaces.iter().cloned(),
    );

    let report = cycle.run(operator_interrupt()).await?;
    match report.status {
        CycleStatus::Aborted => info!("no pods were touched"),
        CycleStatus::Completed if report.candidates.is_empty() => {}
        CycleStatus::Completed => println!("{}", output::render_summary(&report.summary)),
    }
    Ok(())
}

/// Resolves on the first Ctrl+C. Never resolves if the handler cannot be installed.
async fn operator_interrupt() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

pub async fn pods(config: &PodcycleConfig, since_hours: Option<u32>) -> Result<()> {
    let reports = KubeReports::new(connect(&config.kubeconfig_paths).await?);
    let now = Utc::now();
    let cutoff = since_hours.map(|hours| now - Duration::hours(i64::from(hours)));
    let rows = reports.list_pods(cutoff).await?;
    println!("{}", output::render_pods(&rows, since_hours, now));
    Ok(())
}

pub async fn deployments(config: &PodcycleConfig) -> Result<()> {
    let reports = KubeReports::new(connect(&config.kubeconfig_paths).await?);
    let rows = reports.list_deployments().await?;
    println!("{}", output::render_deployments(&rows, Utc::now()));
    Ok(())
}

pub async fn usage(config: &PodcycleConfig) -> Result<()> {
    let reports = KubeReports::new(connect(&config.kubeconfig_paths).await?);
    let report = reports.resource_usage().await?;
    println!("{}", output::render_usage(&report));
    Ok(())
}
