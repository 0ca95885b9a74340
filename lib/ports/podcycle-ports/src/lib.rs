//! Port traits between the restart cycle and the outside world.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use podcycle_domain::{ClusterSnapshot, CycleEvent, Instance};

/// Control-plane operations the restart cycle depends on.
#[async_trait]
pub trait ClusterPort: Send + Sync {
    /// Every pod in every namespace, in API order.
    async fn list_instances(&self) -> Result<ClusterSnapshot>;

    /// Point lookup. `Ok(None)` when the pod does not exist.
    async fn get_instance(&self, namespace: &str, name: &str) -> Result<Option<Instance>>;

    /// Request eviction. Controller-managed pods are recreated by their owner.
    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<()>;

    async fn list_namespace(&self, namespace: &str) -> Result<Vec<Instance>>;
}

/// Decides whether an observed pod replaces an evicted one.
pub trait ReplacementLocator: Send + Sync {
    fn is_replacement(&self, evicted: &Instance, observed: &Instance) -> bool;
}

pub trait ProgressPort: Send + Sync {
    fn publish(&self, event: CycleEvent);
}

#[derive(Clone)]
pub struct PortSet {
    pub cluster: Arc<dyn ClusterPort>,
    pub locator: Arc<dyn ReplacementLocator>,
    pub progress: Arc<dyn ProgressPort>,
}

impl PortSet {
    pub fn new(
        cluster: Arc<dyn ClusterPort>,
        locator: Arc<dyn ReplacementLocator>,
        progress: Arc<dyn ProgressPort>,
    ) -> Self {
        Self {
            cluster,
            locator,
            progress,
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct NullProgressPort;

impl ProgressPort for NullProgressPort {
    fn publish(&self, _event: CycleEvent) {}
}

#[derive(Clone, Default)]
pub struct InMemoryProgressPort {
    events: Arc<Mutex<VecDeque<CycleEvent>>>,
}

impl InMemoryProgressPort {
    pub fn drain_events(&self) -> Vec<CycleEvent> {
        if let Ok(mut guard) = self.events.lock() {
            guard.drain(..).collect()
        } else {
            Vec::new()
        }
    }
}

impl ProgressPort for InMemoryProgressPort {
    fn publish(&self, event: CycleEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push_back(event);
        }
    }
}
