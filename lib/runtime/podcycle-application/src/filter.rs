use std::collections::BTreeSet;

use podcycle_domain::{ClusterSnapshot, Instance};

/// Pods eligible for a restart: outside `protected` namespaces and in phase
/// Running or Pending. Snapshot order is preserved.
pub fn select_candidates(snapshot: &ClusterSnapshot, protected: &BTreeSet<String>) -> Vec<Instance> {
    snapshot
        .iter()
        .filter(|instance| !protected.contains(instance.namespace()))
        .filter(|instance| instance.phase.is_restartable())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcycle_domain::{InstanceKey, InstancePhase};

    fn pod(namespace: &str, name: &str, phase: InstancePhase) -> Instance {
        Instance::new(InstanceKey::new(namespace, name), phase)
    }

    fn protected(namespaces: &[&str]) -> BTreeSet<String> {
        namespaces.iter().map(|ns| ns.to_string()).collect()
    }

    #[test]
    fn test_excludes_protected_namespaces() {
        let snapshot = ClusterSnapshot::new(vec![
            pod("app", "web-1", InstancePhase::Running),
            pod("kube-system", "coredns-1", InstancePhase::Running),
            pod("ingress", "nginx-1", InstancePhase::Running),
        ]);
        let selected = select_candidates(&snapshot, &protected(&["kube-system", "ingress"]));

        assert_eq!(selected.len(), 1);
        assert!(
            selected
                .iter()
                .all(|instance| instance.namespace() != "kube-system"
                    && instance.namespace() != "ingress")
        );
    }

    #[test]
    fn test_keeps_only_running_and_pending() {
        let snapshot = ClusterSnapshot::new(vec![
            pod("app", "a-1", InstancePhase::Running),
            pod("app", "b-1", InstancePhase::Pending),
            pod("app", "c-1", InstancePhase::Succeeded),
            pod("app", "d-1", InstancePhase::Failed),
            pod("app", "e-1", InstancePhase::Unknown),
        ]);
        let names: Vec<_> = select_candidates(&snapshot, &BTreeSet::new())
            .into_iter()
            .map(|instance| instance.key.name)
            .collect();
        assert_eq!(names, vec!["a-1", "b-1"]);
    }

    #[test]
    fn test_preserves_snapshot_order() {
        let snapshot = ClusterSnapshot::new(vec![
            pod("b", "zeta-1", InstancePhase::Running),
            pod("kube-system", "proxy-1", InstancePhase::Running),
            pod("a", "alpha-1", InstancePhase::Pending),
            pod("b", "beta-1", InstancePhase::Running),
        ]);
        let selected = select_candidates(&snapshot, &protected(&["kube-system"]));

        let positions: Vec<usize> = selected
            .iter()
            .map(|candidate| {
                snapshot
                    .iter()
                    .position(|instance| instance.key == candidate.key)
                    .unwrap()
            })
            .collect();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(select_candidates(&ClusterSnapshot::default(), &protected(&["kube-system"])).is_empty());
    }
}
