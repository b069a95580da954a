//! Identity and host value types for the host inventory.
//!
//! Identities are newtypes for type safety. Everything derives serde so wire
//! messages can embed these types directly; collections use BTree variants so
//! encodings are deterministic.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Key/value annotations attached to a host by its discovery provider.
pub type Annotations = BTreeMap<String, String>;

// =============================================================================
// IDENTITY TYPES (newtypes for type safety)
// =============================================================================

/// 48-bit Ethernet hardware address.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| Error::InvalidMac(s.to_string()))?;
            *byte = u8::from_str_radix(part, 16).map_err(|_| Error::InvalidMac(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(Error::InvalidMac(s.to_string()));
        }
        Ok(MacAddr(bytes))
    }
}

/// IEEE 802.1Q VLAN identifier. `VlanId::NONE` marks untagged traffic.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VlanId(pub u16);

impl VlanId {
    /// Untagged / no VLAN.
    pub const NONE: VlanId = VlanId(4095);
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == VlanId::NONE {
            write!(f, "none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identity of an end-station host (hardware address within a VLAN).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId {
    pub mac: MacAddr,
    pub vlan: VlanId,
}

impl HostId {
    pub fn new(mac: MacAddr, vlan: VlanId) -> Self {
        Self { mac, vlan }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mac, self.vlan)
    }
}

impl FromStr for HostId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mac, vlan) = s
            .rsplit_once('/')
            .ok_or_else(|| Error::InvalidHostId(s.to_string()))?;
        let mac: MacAddr = mac.parse().map_err(|_| Error::InvalidHostId(s.to_string()))?;
        let vlan = if vlan == "none" {
            VlanId::NONE
        } else {
            VlanId(
                vlan.parse()
                    .map_err(|_| Error::InvalidHostId(s.to_string()))?,
            )
        };
        Ok(HostId::new(mac, vlan))
    }
}

/// Identity of an infrastructure device (switch).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port number on a device.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortNumber(pub u64);

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the discovery provider that reported a host.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderId(pub String);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ATTACHMENT
// =============================================================================

/// A (device, port) pair: where a host attaches to the network.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectPoint {
    pub device: DeviceId,
    pub port: PortNumber,
}

impl ConnectPoint {
    pub fn new(device: impl Into<String>, port: u64) -> Self {
        Self {
            device: DeviceId(device.into()),
            port: PortNumber(port),
        }
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

impl FromStr for ConnectPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, port) = s
            .rsplit_once('/')
            .ok_or_else(|| Error::InvalidConnectPoint(s.to_string()))?;
        if device.is_empty() {
            return Err(Error::InvalidConnectPoint(s.to_string()));
        }
        let port = port
            .parse::<u64>()
            .map_err(|_| Error::InvalidConnectPoint(s.to_string()))?;
        Ok(ConnectPoint::new(device, port))
    }
}

// =============================================================================
// HOST VALUES
// =============================================================================

/// What a discovery provider reports about a host: identity attributes plus
/// the attachment point it was seen at.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostDescription {
    pub mac: MacAddr,
    pub vlan: VlanId,
    pub location: ConnectPoint,
    pub ips: BTreeSet<IpAddr>,
    pub annotations: Annotations,
}

impl HostDescription {
    pub fn new(mac: MacAddr, vlan: VlanId, location: ConnectPoint) -> Self {
        Self {
            mac,
            vlan,
            location,
            ips: BTreeSet::new(),
            annotations: Annotations::new(),
        }
    }

    /// Add an IP address to the description.
    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ips.insert(ip);
        self
    }

    /// Add an annotation to the description.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// An end-station host as exposed by queries: an immutable snapshot of the
/// stored state at the time of the call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Host {
    pub provider_id: ProviderId,
    pub id: HostId,
    pub mac: MacAddr,
    pub vlan: VlanId,
    pub location: ConnectPoint,
    pub ips: BTreeSet<IpAddr>,
    pub annotations: Annotations,
}

/// Addresses administratively bound to a switch port. Pure local state,
/// never replicated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PortAddresses {
    pub connect_point: ConnectPoint,
    pub ips: BTreeSet<IpAddr>,
    pub mac: Option<MacAddr>,
}

impl PortAddresses {
    pub fn new(connect_point: ConnectPoint) -> Self {
        Self {
            connect_point,
            ips: BTreeSet::new(),
            mac: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_roundtrip() {
        let mac: MacAddr = "00:1b:44:11:3a:b7".parse().unwrap();
        assert_eq!(mac.0, [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        assert_eq!(mac.to_string(), "00:1b:44:11:3a:b7");
    }

    #[test]
    fn test_mac_rejects_malformed() {
        assert!("00:1b:44:11:3a".parse::<MacAddr>().is_err());
        assert!("00:1b:44:11:3a:b7:ff".parse::<MacAddr>().is_err());
        assert!("zz:1b:44:11:3a:b7".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_host_id_roundtrip() {
        let id = HostId::new("aa:bb:cc:dd:ee:ff".parse().unwrap(), VlanId(7));
        assert_eq!(id.to_string(), "aa:bb:cc:dd:ee:ff/7");
        assert_eq!(id.to_string().parse::<HostId>().unwrap(), id);

        let untagged = HostId::new(id.mac, VlanId::NONE);
        assert_eq!(untagged.to_string(), "aa:bb:cc:dd:ee:ff/none");
        assert_eq!(untagged.to_string().parse::<HostId>().unwrap(), untagged);

        assert!("aa:bb:cc:dd:ee:ff".parse::<HostId>().is_err());
        assert!("aa:bb:cc:dd:ee:ff/vlan".parse::<HostId>().is_err());
    }

    #[test]
    fn test_connect_point_parse() {
        let cp: ConnectPoint = "of:0000000000000001/3".parse().unwrap();
        assert_eq!(cp.device.0, "of:0000000000000001");
        assert_eq!(cp.port.0, 3);
        assert_eq!(cp.to_string(), "of:0000000000000001/3");

        assert!("no-port".parse::<ConnectPoint>().is_err());
        assert!("/7".parse::<ConnectPoint>().is_err());
        assert!("dev/abc".parse::<ConnectPoint>().is_err());
    }

    #[test]
    fn test_description_builder() {
        let descr = HostDescription::new(
            "aa:bb:cc:dd:ee:01".parse().unwrap(),
            VlanId::NONE,
            ConnectPoint::new("of:01", 1),
        )
        .with_ip("10.0.0.1".parse().unwrap())
        .with_annotation("rack", "r7");

        assert_eq!(descr.ips.len(), 1);
        assert_eq!(descr.annotations.get("rack").map(String::as_str), Some("r7"));
    }
}
