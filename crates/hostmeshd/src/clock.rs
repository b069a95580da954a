//! Per-host logical clock
//!
//! Issues the timestamps that order updates in the replication protocol.
//! Timestamps for the same host are strictly monotonic: wall-clock millis,
//! with a counter bumped when the wall clock has not advanced past the last
//! issue (or moved backwards).

use hostmesh_core::{HostId, Timestamp};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Timestamp oracle for host mutations.
pub struct HostClock {
    last: Mutex<HashMap<HostId, Timestamp>>,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(HashMap::new()),
        }
    }

    /// Issue the next timestamp for `host_id`, strictly newer than any
    /// timestamp previously issued here for the same host.
    pub fn timestamp(&self, host_id: &HostId) -> Timestamp {
        let mut last = self.last.lock();
        let wall = Timestamp::now();
        let next = match last.get(host_id) {
            Some(prev) if !wall.is_newer(prev) => prev.next(),
            _ => wall,
        };
        last.insert(*host_id, next);
        next
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostmesh_core::VlanId;

    fn host(n: u8) -> HostId {
        HostId::new(hostmesh_core::MacAddr([0, 0, 0, 0, 0, n]), VlanId::NONE)
    }

    #[test]
    fn test_strictly_monotonic_per_host() {
        let clock = HostClock::new();
        let id = host(1);
        let mut prev = clock.timestamp(&id);
        for _ in 0..1000 {
            let next = clock.timestamp(&id);
            assert!(next.is_newer(&prev));
            prev = next;
        }
    }

    #[test]
    fn test_hosts_are_independent() {
        let clock = HostClock::new();
        let a = clock.timestamp(&host(1));
        let b = clock.timestamp(&host(2));
        // Distinct keys may share wall time; each key's sequence is what
        // matters.
        assert!(clock.timestamp(&host(1)).is_newer(&a));
        assert!(clock.timestamp(&host(2)).is_newer(&b));
    }
}
