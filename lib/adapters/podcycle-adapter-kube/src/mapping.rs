//! Conversions from Kubernetes objects to domain types.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use podcycle_domain::{Instance, InstanceKey, InstancePhase};

pub fn instance_from_pod(pod: &Pod) -> Instance {
    let metadata = &pod.metadata;
    let key = InstanceKey::new(
        metadata.namespace.clone().unwrap_or_default(),
        metadata.name.clone().unwrap_or_default(),
    );
    let status = pod.status.as_ref();
    let phase = InstancePhase::from_phase(status.and_then(|status| status.phase.as_deref()));
    let container_ready = status
        .and_then(|status| status.container_statuses.as_ref())
        .map(|statuses| statuses.iter().map(|container| container.ready).collect())
        .unwrap_or_default();

    Instance {
        key,
        phase,
        container_ready,
        created_at: metadata.creation_timestamp.as_ref().and_then(to_utc),
        uid: metadata.uid.clone(),
        terminating: metadata.deletion_timestamp.is_some(),
    }
}

/// `None` only for instants outside chrono's nanosecond range.
pub fn to_utc(time: &Time) -> Option<DateTime<Utc>> {
    time.0
        .timestamp_nanos_opt()
        .map(DateTime::from_timestamp_nanos)
}
