//! Administrative address bindings for switch ports
//!
//! A local multimap from connect point to bound addresses. Not replicated,
//! synchronized independently of the host table.

use hostmesh_core::{ConnectPoint, PortAddresses};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Port address bindings of one node.
pub struct AddressBindings {
    bindings: RwLock<HashMap<ConnectPoint, HashSet<PortAddresses>>>,
}

impl AddressBindings {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Bind addresses to their connect point.
    pub fn update(&self, addresses: PortAddresses) {
        self.bindings
            .write()
            .entry(addresses.connect_point.clone())
            .or_default()
            .insert(addresses);
    }

    /// Remove one binding.
    pub fn remove(&self, addresses: &PortAddresses) {
        let mut bindings = self.bindings.write();
        if let Some(set) = bindings.get_mut(&addresses.connect_point) {
            set.remove(addresses);
            if set.is_empty() {
                bindings.remove(&addresses.connect_point);
            }
        }
    }

    /// Remove every binding for a connect point.
    pub fn clear(&self, connect_point: &ConnectPoint) {
        self.bindings.write().remove(connect_point);
    }

    /// Snapshot of all bindings.
    pub fn all(&self) -> Vec<PortAddresses> {
        self.bindings
            .read()
            .values()
            .flat_map(|set| set.iter().cloned())
            .collect()
    }

    /// Snapshot of the bindings for one connect point.
    pub fn for_port(&self, connect_point: &ConnectPoint) -> Vec<PortAddresses> {
        self.bindings
            .read()
            .get(connect_point)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Drop all state. Used on shutdown.
    pub fn clear_all(&self) {
        self.bindings.write().clear();
    }
}

impl Default for AddressBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(port: u64, ip: &str) -> PortAddresses {
        let mut addresses = PortAddresses::new(ConnectPoint::new("of:01", port));
        addresses.ips.insert(ip.parse().unwrap());
        addresses
    }

    #[test]
    fn test_update_and_query() {
        let bindings = AddressBindings::new();
        bindings.update(binding(1, "10.0.0.1"));
        bindings.update(binding(1, "10.0.0.2"));
        bindings.update(binding(2, "10.0.1.1"));

        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.for_port(&ConnectPoint::new("of:01", 1)).len(), 2);
        assert_eq!(bindings.all().len(), 3);
    }

    #[test]
    fn test_update_is_idempotent() {
        let bindings = AddressBindings::new();
        bindings.update(binding(1, "10.0.0.1"));
        bindings.update(binding(1, "10.0.0.1"));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let bindings = AddressBindings::new();
        let a = binding(1, "10.0.0.1");
        bindings.update(a.clone());
        bindings.update(binding(2, "10.0.1.1"));

        bindings.remove(&a);
        assert!(bindings.for_port(&a.connect_point).is_empty());

        bindings.clear(&ConnectPoint::new("of:01", 2));
        assert!(bindings.is_empty());
    }
}
