//! Host table with last-writer-wins replication semantics
//!
//! Three structures move together under one lock: the live host map, the
//! tombstone map for removed hosts, and the location index. A host id is in
//! at most one of the live and tombstone maps; the location index is a
//! faithful inverse of the live hosts' locations.
//!
//! The transition functions here are pure with respect to I/O: they take an
//! explicit timestamp and report what happened as an optional `HostEvent`.
//! Local calls and replayed peer messages go through the same functions; the
//! gossip engine decides what to broadcast.

use crate::messages::{AntiEntropyAdvertisement, HostFragmentId, HostRemoved, HostUpdate};
use hostmesh_core::{
    Annotations, ConnectPoint, DeviceId, Host, HostDescription, HostEvent, HostEventKind, HostId,
    MacAddr, ProviderId, Timestamp, Timestamped, VlanId,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::net::IpAddr;

/// A live host as stored: immutable identity attributes, plus the location
/// paired with the timestamp at which it was observed. Queries hand out
/// `Host` projections, never this type.
#[derive(Clone, Debug)]
struct StoredHost {
    provider_id: ProviderId,
    id: HostId,
    mac: MacAddr,
    vlan: VlanId,
    ips: BTreeSet<IpAddr>,
    annotations: Annotations,
    location: Timestamped<ConnectPoint>,
}

impl StoredHost {
    fn snapshot(&self) -> Host {
        Host {
            provider_id: self.provider_id.clone(),
            id: self.id,
            mac: self.mac,
            vlan: self.vlan,
            location: self.location.value().clone(),
            ips: self.ips.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// Description used when pushing this host to a lagging peer.
    // TODO: carry annotations in anti-entropy pushes
    fn description_for_push(&self) -> HostDescription {
        HostDescription {
            mac: self.mac,
            vlan: self.vlan,
            location: self.location.value().clone(),
            ips: self.ips.clone(),
            annotations: Annotations::new(),
        }
    }
}

struct Inner {
    hosts: HashMap<HostId, StoredHost>,
    tombstones: HashMap<HostId, Timestamped<Host>>,
    locations: HashMap<ConnectPoint, HashSet<HostId>>,
}

/// What a reconciliation decided: messages to push back to the advertisement
/// sender, and local state transitions already applied.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub push_updates: Vec<HostUpdate>,
    pub push_removes: Vec<HostRemoved>,
    pub events: Vec<HostEvent>,
}

/// The replicated host inventory of one node.
pub struct HostStore {
    inner: Mutex<Inner>,
}

impl HostStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// `hosts_expected` pre-sizes the live and tombstone maps.
    pub fn with_capacity(hosts_expected: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                hosts: HashMap::with_capacity(hosts_expected),
                tombstones: HashMap::with_capacity(hosts_expected),
                locations: HashMap::new(),
            }),
        }
    }

    /// Apply an update observed at `timestamp`. Returns the resulting
    /// transition, or `None` when the update changed nothing (stale
    /// resurrection, duplicate replay, or no new attributes).
    pub fn create_or_update(
        &self,
        provider_id: &ProviderId,
        host_id: &HostId,
        description: &HostDescription,
        timestamp: Timestamp,
    ) -> Option<HostEvent> {
        let mut inner = self.inner.lock();
        if inner.hosts.contains_key(host_id) {
            inner.update_host(provider_id, host_id, description, timestamp)
        } else {
            inner.create_host(provider_id, host_id, description, timestamp)
        }
    }

    /// Apply a removal observed at `timestamp`. Returns `None` when the host
    /// is not live; no tombstone is recorded for a host never seen.
    pub fn remove(&self, host_id: &HostId, timestamp: Timestamp) -> Option<HostEvent> {
        self.inner.lock().remove_host(host_id, timestamp)
    }

    pub fn get(&self, host_id: &HostId) -> Option<Host> {
        self.inner.lock().hosts.get(host_id).map(StoredHost::snapshot)
    }

    pub fn hosts(&self) -> Vec<Host> {
        self.inner.lock().hosts.values().map(StoredHost::snapshot).collect()
    }

    pub fn host_count(&self) -> usize {
        self.inner.lock().hosts.len()
    }

    pub fn tombstone_count(&self) -> usize {
        self.inner.lock().tombstones.len()
    }

    pub fn hosts_by_vlan(&self, vlan: VlanId) -> Vec<Host> {
        self.filter_hosts(|h| h.vlan == vlan)
    }

    pub fn hosts_by_mac(&self, mac: MacAddr) -> Vec<Host> {
        self.filter_hosts(|h| h.mac == mac)
    }

    pub fn hosts_by_ip(&self, ip: IpAddr) -> Vec<Host> {
        self.filter_hosts(|h| h.ips.contains(&ip))
    }

    fn filter_hosts(&self, predicate: impl Fn(&StoredHost) -> bool) -> Vec<Host> {
        self.inner
            .lock()
            .hosts
            .values()
            .filter(|h| predicate(h))
            .map(StoredHost::snapshot)
            .collect()
    }

    /// Hosts attached at exactly this connect point.
    pub fn connected_hosts(&self, connect_point: &ConnectPoint) -> Vec<Host> {
        let inner = self.inner.lock();
        inner
            .locations
            .get(connect_point)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.hosts.get(id))
            .map(StoredHost::snapshot)
            .collect()
    }

    /// Hosts attached anywhere on the device. Scans the index keys; their
    /// cardinality is bounded by the device's port count.
    pub fn connected_hosts_on_device(&self, device: &DeviceId) -> Vec<Host> {
        let inner = self.inner.lock();
        inner
            .locations
            .iter()
            .filter(|(cp, _)| cp.device == *device)
            .flat_map(|(_, ids)| ids)
            .filter_map(|id| inner.hosts.get(id))
            .map(StoredHost::snapshot)
            .collect()
    }

    /// Digest of the full local state for an anti-entropy advertisement:
    /// one timestamp per live host fragment, one per tombstone.
    pub fn digest(
        &self,
    ) -> (
        BTreeMap<HostFragmentId, Timestamp>,
        BTreeMap<HostId, Timestamp>,
    ) {
        let inner = self.inner.lock();
        let timestamps = inner
            .hosts
            .iter()
            .map(|(id, h)| {
                (
                    HostFragmentId::new(*id, h.provider_id.clone()),
                    h.location.timestamp(),
                )
            })
            .collect();
        let tombstones = inner
            .tombstones
            .iter()
            .map(|(id, t)| (*id, t.timestamp()))
            .collect();
        (timestamps, tombstones)
    }

    /// Reconcile against a peer's advertisement. Runs the full scan under the
    /// lock; removals the advertisement proves necessary are applied before
    /// the later scans observe the state.
    pub fn reconcile(&self, ad: &AntiEntropyAdvertisement) -> Reconciliation {
        let mut inner = self.inner.lock();
        let mut outcome = Reconciliation::default();

        // Scan A: local live hosts. Push what the sender is missing or has
        // older; note any newer remove the sender advertises.
        let mut catch_up: Vec<(HostId, Timestamp)> = Vec::new();
        for (host_id, local) in &inner.hosts {
            let fragment = HostFragmentId::new(*host_id, local.provider_id.clone());
            let local_ts = local.location.timestamp();

            let remote = ad
                .timestamps
                .get(&fragment)
                .or_else(|| ad.tombstones.get(host_id));
            if remote.map_or(true, |r| local_ts.is_newer(r)) {
                outcome.push_updates.push(HostUpdate {
                    provider_id: local.provider_id.clone(),
                    host_id: *host_id,
                    description: local.description_for_push(),
                    timestamp: local_ts,
                });
            }

            if let Some(remote_dead) = ad.tombstones.get(host_id) {
                if remote_dead.is_newer(&local_ts) {
                    catch_up.push((*host_id, *remote_dead));
                }
            }
        }
        for (host_id, timestamp) in catch_up {
            if let Some(event) = inner.remove_host(&host_id, timestamp) {
                outcome.events.push(event);
            }
        }

        // Scan B: local tombstones. Where the sender still has the host
        // live with an older timestamp, push the remove (zombie).
        for (host_id, dead) in &inner.tombstones {
            let fragment = HostFragmentId::new(*host_id, dead.value().provider_id.clone());
            if let Some(remote_live) = ad.timestamps.get(&fragment) {
                if dead.timestamp().is_newer(remote_live) {
                    outcome.push_removes.push(HostRemoved {
                        host_id: *host_id,
                        timestamp: dead.timestamp(),
                    });
                }
            }
        }

        // Scan C: remote tombstones newer than a local live host.
        let mut removals: Vec<(HostId, Timestamp)> = Vec::new();
        for (host_id, remote_dead) in &ad.tombstones {
            if let Some(local) = inner.hosts.get(host_id) {
                if remote_dead.is_newer(&local.location.timestamp()) {
                    removals.push((*host_id, *remote_dead));
                }
            }
        }
        for (host_id, timestamp) in removals {
            if let Some(event) = inner.remove_host(&host_id, timestamp) {
                outcome.events.push(event);
            }
        }

        outcome
    }

    /// Drop all state. Used on shutdown.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.hosts.clear();
        inner.tombstones.clear();
        inner.locations.clear();
    }
}

impl Default for HostStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn create_host(
        &mut self,
        provider_id: &ProviderId,
        host_id: &HostId,
        description: &HostDescription,
        timestamp: Timestamp,
    ) -> Option<HostEvent> {
        // A previous removal suppresses this update unless it is newer.
        if let Some(dead) = self.tombstones.get(host_id) {
            if dead.is_newer(&timestamp) {
                return None;
            }
            self.tombstones.remove(host_id);
        }

        let stored = StoredHost {
            provider_id: provider_id.clone(),
            id: *host_id,
            mac: description.mac,
            vlan: description.vlan,
            ips: description.ips.clone(),
            annotations: description.annotations.clone(),
            location: Timestamped::new(description.location.clone(), timestamp),
        };
        let snapshot = stored.snapshot();
        self.locations
            .entry(description.location.clone())
            .or_default()
            .insert(*host_id);
        self.hosts.insert(*host_id, stored);
        Some(HostEvent::new(HostEventKind::Added, snapshot))
    }

    fn update_host(
        &mut self,
        provider_id: &ProviderId,
        host_id: &HostId,
        description: &HostDescription,
        timestamp: Timestamp,
    ) -> Option<HostEvent> {
        let host = self.hosts.get_mut(host_id)?;

        // Location is exclusive, so it alone is timestamp-guarded. Equal
        // timestamps do not move.
        if timestamp.is_newer(&host.location.timestamp())
            && description.location != *host.location.value()
        {
            let previous = host.location.value().clone();
            host.location = Timestamped::new(description.location.clone(), timestamp);
            let snapshot = host.snapshot();
            self.detach_location(&previous, host_id);
            self.locations
                .entry(description.location.clone())
                .or_default()
                .insert(*host_id);
            return Some(HostEvent::new(HostEventKind::Moved, snapshot));
        }

        // IPs and annotations accumulate and never regress, so no timestamp
        // comparison here. A replay that would change nothing is a no-op.
        let annotations_unchanged = description
            .annotations
            .iter()
            .all(|(key, value)| host.annotations.get(key) == Some(value));
        if host.ips.is_superset(&description.ips) && annotations_unchanged {
            return None;
        }

        host.ips.extend(description.ips.iter().cloned());
        for (key, value) in &description.annotations {
            host.annotations.insert(key.clone(), value.clone());
        }
        host.provider_id = provider_id.clone();
        Some(HostEvent::new(HostEventKind::Updated, host.snapshot()))
    }

    fn remove_host(&mut self, host_id: &HostId, timestamp: Timestamp) -> Option<HostEvent> {
        let stored = self.hosts.remove(host_id)?;
        let location = stored.location.value().clone();
        self.detach_location(&location, host_id);
        let snapshot = stored.snapshot();
        self.tombstones
            .insert(*host_id, Timestamped::new(snapshot.clone(), timestamp));
        Some(HostEvent::new(HostEventKind::Removed, snapshot))
    }

    fn detach_location(&mut self, connect_point: &ConnectPoint, host_id: &HostId) {
        if let Some(ids) = self.locations.get_mut(connect_point) {
            ids.remove(host_id);
            if ids.is_empty() {
                self.locations.remove(connect_point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostmesh_net::NodeId;

    fn provider() -> ProviderId {
        ProviderId("lldp".to_string())
    }

    fn host_id(n: u8) -> HostId {
        HostId::new(MacAddr([0, 0, 0, 0, 0, n]), VlanId::NONE)
    }

    fn descr(n: u8, location: ConnectPoint) -> HostDescription {
        HostDescription::new(MacAddr([0, 0, 0, 0, 0, n]), VlanId::NONE, location)
    }

    fn ts(n: u64) -> Timestamp {
        Timestamp::new(n, 0)
    }

    fn cp(port: u64) -> ConnectPoint {
        ConnectPoint::new("of:0000000000000001", port)
    }

    fn ad(
        timestamps: Vec<(HostId, ProviderId, Timestamp)>,
        tombstones: Vec<(HostId, Timestamp)>,
    ) -> AntiEntropyAdvertisement {
        AntiEntropyAdvertisement {
            sender: NodeId::new("peer"),
            timestamps: timestamps
                .into_iter()
                .map(|(h, p, t)| (HostFragmentId::new(h, p), t))
                .collect(),
            tombstones: tombstones.into_iter().collect(),
        }
    }

    #[test]
    fn test_add_move_remove() {
        let store = HostStore::new();
        let id = host_id(1);

        let added = store
            .create_or_update(
                &provider(),
                &id,
                &descr(1, cp(1)).with_ip("10.0.0.1".parse().unwrap()),
                ts(1),
            )
            .unwrap();
        assert_eq!(added.kind, HostEventKind::Added);
        assert_eq!(added.host.location, cp(1));

        let moved = store
            .create_or_update(&provider(), &id, &descr(1, cp(2)), ts(2))
            .unwrap();
        assert_eq!(moved.kind, HostEventKind::Moved);
        assert_eq!(moved.host.location, cp(2));
        // The move left the earlier IPs intact.
        assert_eq!(moved.host.ips.len(), 1);

        let removed = store.remove(&id, ts(3)).unwrap();
        assert_eq!(removed.kind, HostEventKind::Removed);
        assert_eq!(store.host_count(), 0);
        assert_eq!(store.tombstone_count(), 1);
        assert!(store.connected_hosts(&cp(2)).is_empty());

        let (_, tombstones) = store.digest();
        assert_eq!(tombstones.get(&id), Some(&ts(3)));
    }

    #[test]
    fn test_stale_resurrection_suppressed() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(1));
        store.remove(&id, ts(3));

        // A replayed older update must not bring the host back.
        assert!(store
            .create_or_update(&provider(), &id, &descr(1, cp(2)), ts(2))
            .is_none());
        assert_eq!(store.host_count(), 0);
        assert_eq!(store.tombstone_count(), 1);
    }

    #[test]
    fn test_newer_update_revives() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(1));
        store.remove(&id, ts(3));

        let event = store
            .create_or_update(&provider(), &id, &descr(1, cp(2)), ts(4))
            .unwrap();
        assert_eq!(event.kind, HostEventKind::Added);
        assert_eq!(store.tombstone_count(), 0);
        assert_eq!(store.get(&id).unwrap().location, cp(2));
    }

    #[test]
    fn test_equal_timestamp_does_not_move() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(5));

        assert!(store
            .create_or_update(&provider(), &id, &descr(1, cp(2)), ts(5))
            .is_none());
        assert_eq!(store.get(&id).unwrap().location, cp(1));
    }

    #[test]
    fn test_move_to_same_location_is_no_op() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(1));
        assert!(store
            .create_or_update(&provider(), &id, &descr(1, cp(1)), ts(2))
            .is_none());
    }

    #[test]
    fn test_older_update_still_contributes_ips() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(
            &provider(),
            &id,
            &descr(1, cp(1)).with_ip("10.0.0.1".parse().unwrap()),
            ts(5),
        );

        // Older timestamp, different location: no move, but the address
        // accumulates.
        let event = store
            .create_or_update(
                &provider(),
                &id,
                &descr(1, cp(2)).with_ip("10.0.0.2".parse().unwrap()),
                ts(3),
            )
            .unwrap();
        assert_eq!(event.kind, HostEventKind::Updated);
        let host = store.get(&id).unwrap();
        assert_eq!(host.location, cp(1));
        assert_eq!(host.ips.len(), 2);
    }

    #[test]
    fn test_duplicate_replay_is_no_op() {
        let store = HostStore::new();
        let id = host_id(1);
        let description = descr(1, cp(1))
            .with_ip("10.0.0.1".parse().unwrap())
            .with_annotation("rack", "r1");

        assert!(store
            .create_or_update(&provider(), &id, &description, ts(1))
            .is_some());
        // Same payload again, newer timestamp: nothing to change.
        assert!(store
            .create_or_update(&provider(), &id, &description, ts(2))
            .is_none());
    }

    #[test]
    fn test_annotations_merge() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(
            &provider(),
            &id,
            &descr(1, cp(1)).with_annotation("rack", "r1"),
            ts(1),
        );

        let event = store
            .create_or_update(
                &provider(),
                &id,
                &descr(1, cp(1))
                    .with_annotation("rack", "r2")
                    .with_annotation("owner", "netops"),
                ts(2),
            )
            .unwrap();
        assert_eq!(event.kind, HostEventKind::Updated);
        let host = store.get(&id).unwrap();
        assert_eq!(host.annotations.get("rack").map(String::as_str), Some("r2"));
        assert_eq!(
            host.annotations.get("owner").map(String::as_str),
            Some("netops")
        );
    }

    #[test]
    fn test_conflicting_moves_converge_either_order() {
        // Two replicas apply the same pair of updates in opposite orders and
        // end up at the same location.
        let newer = descr(1, cp(9));
        let older = descr(1, cp(3));
        let id = host_id(1);

        let a = HostStore::new();
        a.create_or_update(&provider(), &id, &older, ts(5));
        let second = a.create_or_update(&provider(), &id, &newer, ts(6)).unwrap();
        assert_eq!(second.kind, HostEventKind::Moved);

        let b = HostStore::new();
        b.create_or_update(&provider(), &id, &newer, ts(6));
        // The older update arrives late: same attributes, older location.
        assert!(b.create_or_update(&provider(), &id, &older, ts(5)).is_none());

        assert_eq!(a.get(&id).unwrap().location, cp(9));
        assert_eq!(b.get(&id).unwrap().location, cp(9));
    }

    #[test]
    fn test_remove_unknown_records_nothing() {
        let store = HostStore::new();
        assert!(store.remove(&host_id(1), ts(1)).is_none());
        assert_eq!(store.tombstone_count(), 0);
    }

    #[test]
    fn test_location_index_tracks_moves() {
        let store = HostStore::new();
        store.create_or_update(&provider(), &host_id(1), &descr(1, cp(1)), ts(1));
        store.create_or_update(&provider(), &host_id(2), &descr(2, cp(1)), ts(1));
        assert_eq!(store.connected_hosts(&cp(1)).len(), 2);

        store.create_or_update(&provider(), &host_id(1), &descr(1, cp(2)), ts(2));
        assert_eq!(store.connected_hosts(&cp(1)).len(), 1);
        assert_eq!(store.connected_hosts(&cp(2)).len(), 1);

        let on_device = store.connected_hosts_on_device(&DeviceId(
            "of:0000000000000001".to_string(),
        ));
        assert_eq!(on_device.len(), 2);
    }

    #[test]
    fn test_attribute_queries() {
        let store = HostStore::new();
        store.create_or_update(
            &provider(),
            &host_id(1),
            &descr(1, cp(1)).with_ip("10.0.0.1".parse().unwrap()),
            ts(1),
        );
        store.create_or_update(&provider(), &host_id(2), &descr(2, cp(2)), ts(1));

        assert_eq!(store.hosts().len(), 2);
        assert_eq!(store.hosts_by_vlan(VlanId::NONE).len(), 2);
        assert_eq!(store.hosts_by_vlan(VlanId(7)).len(), 0);
        assert_eq!(store.hosts_by_mac(MacAddr([0, 0, 0, 0, 0, 1])).len(), 1);
        assert_eq!(store.hosts_by_ip("10.0.0.1".parse().unwrap()).len(), 1);
        assert_eq!(store.hosts_by_ip("10.9.9.9".parse().unwrap()).len(), 0);
    }

    #[test]
    fn test_reconcile_pushes_missing_host() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(
            &provider(),
            &id,
            &descr(1, cp(1))
                .with_ip("10.0.0.1".parse().unwrap())
                .with_annotation("rack", "r1"),
            ts(10),
        );

        // Sender knows nothing about the host: push it.
        let outcome = store.reconcile(&ad(vec![], vec![]));
        assert_eq!(outcome.push_updates.len(), 1);
        assert!(outcome.push_removes.is_empty());
        assert!(outcome.events.is_empty());

        let pushed = &outcome.push_updates[0];
        assert_eq!(pushed.host_id, id);
        assert_eq!(pushed.timestamp, ts(10));
        assert_eq!(pushed.description.location, cp(1));
        assert_eq!(pushed.description.ips.len(), 1);
        // The rebuilt description does not carry annotations.
        assert!(pushed.description.annotations.is_empty());
    }

    #[test]
    fn test_reconcile_pushes_remove_for_zombie() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(15));
        store.remove(&id, ts(20));

        // Sender still has the host live at 15.
        let outcome = store.reconcile(&ad(vec![(id, provider(), ts(15))], vec![]));
        assert!(outcome.push_updates.is_empty());
        assert_eq!(outcome.push_removes.len(), 1);
        assert_eq!(outcome.push_removes[0].host_id, id);
        assert_eq!(outcome.push_removes[0].timestamp, ts(20));
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_reconcile_applies_remote_tombstone() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(8));

        let outcome = store.reconcile(&ad(vec![], vec![(id, ts(12))]));
        assert!(outcome.push_updates.is_empty());
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].kind, HostEventKind::Removed);
        assert_eq!(store.host_count(), 0);

        let (_, tombstones) = store.digest();
        assert_eq!(tombstones.get(&id), Some(&ts(12)));
    }

    #[test]
    fn test_reconcile_older_remote_tombstone_pushes_host() {
        let store = HostStore::new();
        let id = host_id(1);
        store.create_or_update(&provider(), &id, &descr(1, cp(1)), ts(10));

        // The sender's tombstone predates our live host: it is the sender
        // who is behind.
        let outcome = store.reconcile(&ad(vec![], vec![(id, ts(7))]));
        assert_eq!(outcome.push_updates.len(), 1);
        assert!(outcome.events.is_empty());
        assert_eq!(store.host_count(), 1);
    }

    #[test]
    fn test_reconcile_identical_state_is_quiet() {
        let store = HostStore::new();
        let live = host_id(1);
        let dead = host_id(2);
        store.create_or_update(&provider(), &live, &descr(1, cp(1)), ts(4));
        store.create_or_update(&provider(), &dead, &descr(2, cp(2)), ts(5));
        store.remove(&dead, ts(6));

        let outcome = store.reconcile(&ad(
            vec![(live, provider(), ts(4))],
            vec![(dead, ts(6))],
        ));
        assert!(outcome.push_updates.is_empty());
        assert!(outcome.push_removes.is_empty());
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn test_reconcile_ignores_unknown_tombstones() {
        let store = HostStore::new();
        let outcome = store.reconcile(&ad(vec![], vec![(host_id(9), ts(3))]));
        assert!(outcome.push_updates.is_empty());
        assert!(outcome.push_removes.is_empty());
        assert!(outcome.events.is_empty());
    }
}
