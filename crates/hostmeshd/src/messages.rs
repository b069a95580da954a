//! Wire messages exchanged between cluster peers
//!
//! All payloads are postcard-encoded; the encoding identity must match on
//! every node. Advertisement maps use `BTreeMap` so encodings are
//! deterministic.

use hostmesh_core::{HostDescription, HostId, ProviderId, Timestamp};
use hostmesh_net::{MessageSubject, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subject for full host updates (broadcast and anti-entropy pushes).
pub const HOST_UPDATED: MessageSubject = MessageSubject::new("host-updated");

/// Subject for host removals.
pub const HOST_REMOVED: MessageSubject = MessageSubject::new("host-removed");

/// Subject for anti-entropy advertisements.
pub const HOST_ANTI_ENTROPY_ADVERTISEMENT: MessageSubject =
    MessageSubject::new("host-anti-entropy-advertisement");

/// A full host update: everything a peer needs to replay the mutation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostUpdate {
    pub provider_id: ProviderId,
    pub host_id: HostId,
    pub description: HostDescription,
    pub timestamp: Timestamp,
}

/// A host removal with the timestamp at which it happened.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostRemoved {
    pub host_id: HostId,
    pub timestamp: Timestamp,
}

/// Keys a live advertisement entry by (host, provider) so a future
/// multi-provider split stays wire-compatible.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostFragmentId {
    pub host_id: HostId,
    pub provider_id: ProviderId,
}

impl HostFragmentId {
    pub fn new(host_id: HostId, provider_id: ProviderId) -> Self {
        Self {
            host_id,
            provider_id,
        }
    }
}

/// Compact digest of one node's full state: a timestamp per live host
/// fragment and per tombstone. The receiver decides who is behind; payloads
/// only flow where a gap was found.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AntiEntropyAdvertisement {
    pub sender: NodeId,
    pub timestamps: BTreeMap<HostFragmentId, Timestamp>,
    pub tombstones: BTreeMap<HostId, Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostmesh_core::{ConnectPoint, MacAddr, VlanId};

    #[test]
    fn test_advertisement_roundtrip() {
        let mac: MacAddr = "aa:bb:cc:00:00:01".parse().unwrap();
        let host_id = HostId::new(mac, VlanId::NONE);
        let mut timestamps = BTreeMap::new();
        timestamps.insert(
            HostFragmentId::new(host_id, ProviderId("lldp".to_string())),
            Timestamp::new(17, 2),
        );
        let mut tombstones = BTreeMap::new();
        tombstones.insert(
            HostId::new(mac, VlanId(9)),
            Timestamp::new(20, 0),
        );

        let ad = AntiEntropyAdvertisement {
            sender: NodeId::new("n1"),
            timestamps,
            tombstones,
        };

        let bytes = postcard::to_allocvec(&ad).unwrap();
        let decoded: AntiEntropyAdvertisement = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, ad);
    }

    #[test]
    fn test_host_update_roundtrip() {
        let mac: MacAddr = "aa:bb:cc:00:00:02".parse().unwrap();
        let update = HostUpdate {
            provider_id: ProviderId("arp".to_string()),
            host_id: HostId::new(mac, VlanId(5)),
            description: HostDescription::new(mac, VlanId(5), ConnectPoint::new("of:01", 4))
                .with_ip("10.1.2.3".parse().unwrap())
                .with_annotation("rack", "r2"),
            timestamp: Timestamp::new(99, 1),
        };

        let bytes = postcard::to_allocvec(&update).unwrap();
        let decoded: HostUpdate = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, update);
    }
}
