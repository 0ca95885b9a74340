//! Pods as seen by the restart cycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey {
    pub namespace: String,
    pub name: String,
}

impl InstanceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstancePhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl InstancePhase {
    /// Parse a pod `status.phase` value. Missing or unrecognised phases map to `Unknown`.
    pub fn from_phase(phase: Option<&str>) -> Self {
        match phase {
            Some("Pending") => Self::Pending,
            Some("Running") => Self::Running,
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    /// Phases eligible for a restart.
    pub fn is_restartable(&self) -> bool {
        matches!(self, Self::Running | Self::Pending)
    }
}

impl fmt::Display for InstancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal readiness states reached by a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub key: InstanceKey,
    pub phase: InstancePhase,
    /// One flag per reported container status. May be empty.
    pub container_ready: Vec<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub uid: Option<String>,
    /// Set once the pod carries a deletion timestamp.
    pub terminating: bool,
}

impl Instance {
    pub fn new(key: InstanceKey, phase: InstancePhase) -> Self {
        Self {
            key,
            phase,
            container_ready: Vec::new(),
            created_at: None,
            uid: None,
            terminating: false,
        }
    }

    pub fn with_containers(mut self, ready: impl IntoIterator<Item = bool>) -> Self {
        self.container_ready = ready.into_iter().collect();
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn terminating(mut self) -> Self {
        self.terminating = true;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Running with every reported container ready (or none reported) is `Ready`;
    /// Succeeded is `Completed`; anything else is not yet terminal.
    pub fn readiness(&self) -> Option<Readiness> {
        match self.phase {
            InstancePhase::Running if self.container_ready.iter().all(|ready| *ready) => {
                Some(Readiness::Ready)
            }
            InstancePhase::Succeeded => Some(Readiness::Completed),
            _ => None,
        }
    }
}

/// Ordered pod list from a single all-namespace query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSnapshot {
    instances: Vec<Instance>,
}

impl ClusterSnapshot {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }
}

impl From<Vec<Instance>> for ClusterSnapshot {
    fn from(instances: Vec<Instance>) -> Self {
        Self::new(instances)
    }
}

impl<'a> IntoIterator for &'a ClusterSnapshot {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(phase: InstancePhase) -> Instance {
        Instance::new(InstanceKey::new("app", "web-1"), phase)
    }

    #[test]
    fn test_running_with_all_containers_ready() {
        let instance = pod(InstancePhase::Running).with_containers([true, true]);
        assert_eq!(instance.readiness(), Some(Readiness::Ready));
    }

    #[test]
    fn test_running_with_unready_container() {
        let instance = pod(InstancePhase::Running).with_containers([true, false]);
        assert_eq!(instance.readiness(), None);
    }

    #[test]
    fn test_running_without_container_statuses_is_ready() {
        assert_eq!(pod(InstancePhase::Running).readiness(), Some(Readiness::Ready));
    }

    #[test]
    fn test_succeeded_is_completed() {
        let instance = pod(InstancePhase::Succeeded).with_containers([false]);
        assert_eq!(instance.readiness(), Some(Readiness::Completed));
    }

    #[test]
    fn test_other_phases_are_not_terminal() {
        for phase in [
            InstancePhase::Pending,
            InstancePhase::Failed,
            InstancePhase::Unknown,
        ] {
            assert_eq!(pod(phase).readiness(), None, "{phase}");
        }
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!(InstancePhase::from_phase(Some("Running")), InstancePhase::Running);
        assert_eq!(InstancePhase::from_phase(Some("Evicted")), InstancePhase::Unknown);
        assert_eq!(InstancePhase::from_phase(None), InstancePhase::Unknown);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(InstanceKey::new("app", "web-1").to_string(), "app/web-1");
    }
}
