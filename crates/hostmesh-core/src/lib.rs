//! hostmesh-core - domain types for the replicated host inventory
//!
//! Identities, host values, logical time, and the event surface shared by
//! every node of the cluster. Wire payloads are postcard-encoded; all types
//! here derive serde for that purpose.

pub mod error;
pub mod event;
pub mod time;
pub mod types;

pub use error::{Error, Result};
pub use event::{HostEvent, HostEventKind, HostStoreDelegate};
pub use time::{Timestamp, Timestamped};
pub use types::{
    Annotations, ConnectPoint, DeviceId, Host, HostDescription, HostId, MacAddr, PortAddresses,
    PortNumber, ProviderId, VlanId,
};
