//! Read-only cluster reports: pods, deployments and resource usage.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::Client;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use serde_json::Value;
use tracing::{debug, warn};

use podcycle_domain::{InstanceKey, InstancePhase, cpu_to_millicores, memory_to_mib};

use crate::mapping::{instance_from_pod, to_utc};

#[derive(Debug, Clone, PartialEq)]
pub struct PodRow {
    pub namespace: String,
    pub name: String,
    pub phase: InstancePhase,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRow {
    pub namespace: String,
    pub name: String,
    pub replicas: i32,
    pub ready: i32,
    pub available: i32,
    pub created_at: Option<DateTime<Utc>>,
}

/// Requests and limits summed over a pod's containers. CPU in millicores, memory in MiB.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    pub namespace: String,
    pub name: String,
    pub phase: InstancePhase,
    pub cpu_request: f64,
    pub cpu_limit: f64,
    pub memory_request: f64,
    pub memory_limit: f64,
    /// Live usage; only known for Running pods when the metrics API answers.
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTotals {
    pub cpu_request: f64,
    pub cpu_limit: f64,
    pub memory_request: f64,
    pub memory_limit: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

impl UsageTotals {
    /// Usage as a percentage of requests, if anything was requested.
    pub fn cpu_utilisation(&self) -> Option<f64> {
        percentage(self.cpu_usage, self.cpu_request)
    }

    pub fn memory_utilisation(&self) -> Option<f64> {
        percentage(self.memory_usage, self.memory_request)
    }
}

fn percentage(used: f64, requested: f64) -> Option<f64> {
    (requested > 0.0).then(|| used / requested * 100.0)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    pub rows: Vec<UsageRow>,
    pub metrics_available: bool,
}

impl UsageReport {
    pub fn totals(&self) -> UsageTotals {
        self.rows
            .iter()
            .fold(UsageTotals::default(), |mut totals, row| {
                totals.cpu_request += row.cpu_request;
                totals.cpu_limit += row.cpu_limit;
                totals.memory_request += row.memory_request;
                totals.memory_limit += row.memory_limit;
                totals.cpu_usage += row.cpu_usage.unwrap_or_default();
                totals.memory_usage += row.memory_usage.unwrap_or_default();
                totals
            })
    }

    pub fn phase_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.phase.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Report queries against the API server.
#[derive(Clone)]
pub struct KubeReports {
    client: Client,
}

impl KubeReports {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// All pods, or only those created after `created_after`.
    pub async fn list_pods(&self, created_after: Option<DateTime<Utc>>) -> Result<Vec<PodRow>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&ListParams::default())
            .await
            .context("failed to list pods across all namespaces")?;
        let rows = list.items.iter().map(pod_row).collect();
        Ok(created_since(rows, created_after))
    }

    pub async fn list_deployments(&self) -> Result<Vec<DeploymentRow>> {
        let deployments: Api<Deployment> = Api::all(self.client.clone());
        let list = deployments
            .list(&ListParams::default())
            .await
            .context("failed to list deployments across all namespaces")?;
        Ok(list.items.iter().map(deployment_row).collect())
    }

    /// Requests and limits per pod, plus live usage when `metrics.k8s.io` is served.
    pub async fn resource_usage(&self) -> Result<UsageReport> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&ListParams::default())
            .await
            .context("failed to list pods across all namespaces")?;
        let metrics = self.pod_metrics().await;
        Ok(usage_report(&list.items, metrics.as_ref()))
    }

    async fn pod_metrics(&self) -> Option<HashMap<InstanceKey, (f64, f64)>> {
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "PodMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "pods");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        match api.list(&ListParams::default()).await {
            Ok(list) => {
                debug!(count = list.items.len(), "fetched pod metrics");
                Some(
                    list.items
                        .iter()
                        .map(|metrics| {
                            let key = InstanceKey::new(
                                metrics.metadata.namespace.clone().unwrap_or_default(),
                                metrics.metadata.name.clone().unwrap_or_default(),
                            );
                            (key, container_usage(&metrics.data))
                        })
                        .collect(),
                )
            }
            Err(err) => {
                warn!(error = %err, "metrics API unavailable");
                None
            }
        }
    }
}

fn pod_row(pod: &Pod) -> PodRow {
    let instance = instance_from_pod(pod);
    PodRow {
        namespace: instance.key.namespace,
        name: instance.key.name,
        phase: instance.phase,
        created_at: instance.created_at,
    }
}

fn deployment_row(deployment: &Deployment) -> DeploymentRow {
    let status = deployment.status.as_ref();
    DeploymentRow {
        namespace: deployment.metadata.namespace.clone().unwrap_or_default(),
        name: deployment.metadata.name.clone().unwrap_or_default(),
        replicas: deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.replicas)
            .unwrap_or_default(),
        ready: status
            .and_then(|status| status.ready_replicas)
            .unwrap_or_default(),
        available: status
            .and_then(|status| status.available_replicas)
            .unwrap_or_default(),
        created_at: deployment
            .metadata
            .creation_timestamp
            .as_ref()
            .and_then(to_utc),
    }
}

fn created_since(rows: Vec<PodRow>, cutoff: Option<DateTime<Utc>>) -> Vec<PodRow> {
    match cutoff {
        None => rows,
        Some(cutoff) => rows
            .into_iter()
            .filter(|row| row.created_at.is_some_and(|created| created > cutoff))
            .collect(),
    }
}

/// Sum `containers[].usage` of a PodMetrics object into (millicores, MiB).
fn container_usage(data: &Value) -> (f64, f64) {
    let Some(containers) = data.get("containers").and_then(Value::as_array) else {
        return (0.0, 0.0);
    };
    containers.iter().fold((0.0, 0.0), |(cpu, memory), container| {
        let usage = container.get("usage");
        (
            cpu + cpu_to_millicores(usage_field(usage, "cpu")),
            memory + memory_to_mib(usage_field(usage, "memory")),
        )
    })
}

fn usage_field<'a>(usage: Option<&'a Value>, name: &str) -> &'a str {
    usage
        .and_then(|usage| usage.get(name))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn quantity<'a>(resources: Option<&'a BTreeMap<String, Quantity>>, name: &str) -> &'a str {
    resources
        .and_then(|resources| resources.get(name))
        .map(|quantity| quantity.0.as_str())
        .unwrap_or_default()
}

fn usage_row(pod: &Pod, metrics: Option<&HashMap<InstanceKey, (f64, f64)>>) -> UsageRow {
    let instance = instance_from_pod(pod);
    let mut row = UsageRow {
        namespace: instance.key.namespace.clone(),
        name: instance.key.name.clone(),
        phase: instance.phase,
        cpu_request: 0.0,
        cpu_limit: 0.0,
        memory_request: 0.0,
        memory_limit: 0.0,
        cpu_usage: None,
        memory_usage: None,
    };

    let containers = pod.spec.as_ref().map(|spec| spec.containers.as_slice());
    for container in containers.unwrap_or_default() {
        let resources = container.resources.as_ref();
        let requests = resources.and_then(|resources| resources.requests.as_ref());
        let limits = resources.and_then(|resources| resources.limits.as_ref());
        row.cpu_request += cpu_to_millicores(quantity(requests, "cpu"));
        row.cpu_limit += cpu_to_millicores(quantity(limits, "cpu"));
        row.memory_request += memory_to_mib(quantity(requests, "memory"));
        row.memory_limit += memory_to_mib(quantity(limits, "memory"));
    }

    if instance.phase == InstancePhase::Running {
        if let Some(&(cpu, memory)) = metrics.and_then(|metrics| metrics.get(&instance.key)) {
            row.cpu_usage = Some(cpu);
            row.memory_usage = Some(memory);
        }
    }
    row
}

fn usage_report(pods: &[Pod], metrics: Option<&HashMap<InstanceKey, (f64, f64)>>) -> UsageReport {
    let mut rows: Vec<UsageRow> = pods.iter().map(|pod| usage_row(pod, metrics)).collect();
    rows.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
    UsageReport {
        rows,
        metrics_available: metrics.is_some(),
    }
}
