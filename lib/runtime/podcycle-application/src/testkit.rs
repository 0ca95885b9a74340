//! In-memory cluster that evicts and recreates pods like a ReplicaSet would.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use podcycle_domain::{ClusterSnapshot, Instance, InstanceKey, InstancePhase};
use podcycle_ports::ClusterPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    ListAll,
    Get(InstanceKey),
    Delete(InstanceKey),
    ListNamespace(String),
}

#[derive(Default)]
pub struct SimulatedCluster {
    state: Mutex<SimState>,
}

#[derive(Default)]
struct SimState {
    pods: Vec<Instance>,
    snapshot_error: Option<String>,
    failing_deletes: HashSet<InstanceKey>,
    unmanaged: HashSet<InstanceKey>,
    ready_after: u32,
    warming: HashMap<InstanceKey, u32>,
    transient_errors: u32,
    generation: u32,
    calls: Vec<ClusterCall>,
}

impl SimulatedCluster {
    pub fn new(pods: Vec<Instance>) -> Self {
        let cluster = Self::default();
        cluster.lock().pods = pods;
        cluster
    }

    /// The initial all-namespace list fails with `message`.
    pub fn fail_snapshot(mut self, message: &str) -> Self {
        self.state_mut().snapshot_error = Some(message.to_string());
        self
    }

    pub fn fail_delete(mut self, key: InstanceKey) -> Self {
        self.state_mut().failing_deletes.insert(key);
        self
    }

    /// Deleting this pod does not spawn a replacement.
    pub fn unmanaged(mut self, key: InstanceKey) -> Self {
        self.state_mut().unmanaged.insert(key);
        self
    }

    /// Replacements stay Pending for `observations` queries before turning ready.
    pub fn replacements_ready_after(mut self, observations: u32) -> Self {
        self.state_mut().ready_after = observations;
        self
    }

    /// The next `count` point or namespace queries fail.
    pub fn transient_errors(mut self, count: u32) -> Self {
        self.state_mut().transient_errors = count;
        self
    }

    pub fn calls(&self) -> Vec<ClusterCall> {
        self.lock().calls.clone()
    }

    pub fn deletes(&self) -> Vec<InstanceKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ClusterCall::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut SimState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SimState {
    fn take_transient_error(&mut self) -> Result<()> {
        if self.transient_errors > 0 {
            self.transient_errors -= 1;
            bail!("simulated transient API error");
        }
        Ok(())
    }

    /// Advance warming replacements, then return what a query would see.
    /// Terminating pods are visible exactly once.
    fn observe(&mut self) -> Vec<Instance> {
        let mut ready = Vec::new();
        for (key, remaining) in self.warming.iter_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                ready.push(key.clone());
            }
        }
        for key in ready {
            self.warming.remove(&key);
            if let Some(pod) = self.pods.iter_mut().find(|pod| pod.key == key) {
                pod.phase = InstancePhase::Running;
                pod.container_ready = vec![true];
            }
        }
        let view = self.pods.clone();
        self.pods.retain(|pod| !pod.terminating);
        view
    }

    fn spawn_replacement(&mut self, evicted: &InstanceKey) {
        self.generation += 1;
        let base = evicted
            .name
            .rsplit_once('-')
            .map(|(base, _)| base)
            .unwrap_or(&evicted.name);
        let key = InstanceKey::new(
            evicted.namespace.clone(),
            format!("{base}-r{}", self.generation),
        );
        let mut pod = Instance::new(key.clone(), InstancePhase::Pending)
            .with_containers([false])
            .with_uid(format!("sim-uid-{}", self.generation));
        if self.ready_after == 0 {
            pod.phase = InstancePhase::Running;
            pod.container_ready = vec![true];
        } else {
            self.warming.insert(key, self.ready_after);
        }
        self.pods.push(pod);
    }
}

#[async_trait]
impl ClusterPort for SimulatedCluster {
    async fn list_instances(&self) -> Result<ClusterSnapshot> {
        let mut state = self.lock();
        state.calls.push(ClusterCall::ListAll);
        if let Some(message) = &state.snapshot_error {
            return Err(anyhow!(message.clone()));
        }
        Ok(ClusterSnapshot::new(state.pods.clone()))
    }

    async fn get_instance(&self, namespace: &str, name: &str) -> Result<Option<Instance>> {
        let mut state = self.lock();
        let key = InstanceKey::new(namespace, name);
        state.calls.push(ClusterCall::Get(key.clone()));
        state.take_transient_error()?;
        Ok(state.observe().into_iter().find(|pod| pod.key == key))
    }

    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.lock();
        let key = InstanceKey::new(namespace, name);
        state.calls.push(ClusterCall::Delete(key.clone()));
        if state.failing_deletes.contains(&key) {
            bail!("simulated delete failure for {key}");
        }
        let Some(pod) = state.pods.iter_mut().find(|pod| pod.key == key && !pod.terminating)
        else {
            bail!("pods \"{name}\" not found");
        };
        pod.terminating = true;
        if !state.unmanaged.contains(&key) {
            state.spawn_replacement(&key);
        }
        Ok(())
    }

    async fn list_namespace(&self, namespace: &str) -> Result<Vec<Instance>> {
        let mut state = self.lock();
        state
            .calls
            .push(ClusterCall::ListNamespace(namespace.to_string()));
        state.take_transient_error()?;
        Ok(state
            .observe()
            .into_iter()
            .filter(|pod| pod.namespace() == namespace)
            .collect())
    }
}
