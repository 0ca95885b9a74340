use podcycle_domain::Instance;
use podcycle_ports::ReplacementLocator;

/// Matches replacements by the evicted pod's first hyphen-delimited name
/// segment within the same namespace.
///
/// Two unrelated workloads sharing that segment are indistinguishable here.
/// Terminating pods and pods carrying the evicted UID are never replacements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamePrefixLocator;

pub fn name_prefix(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

impl ReplacementLocator for NamePrefixLocator {
    fn is_replacement(&self, evicted: &Instance, observed: &Instance) -> bool {
        if observed.terminating {
            return false;
        }
        if evicted.uid.is_some() && observed.uid == evicted.uid {
            return false;
        }
        observed.namespace() == evicted.namespace()
            && observed.name().starts_with(name_prefix(evicted.name()))
    }
}
