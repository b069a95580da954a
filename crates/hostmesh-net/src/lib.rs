//! hostmesh-net - cluster identity and messaging
//!
//! Defines who the cluster members are (`cluster`), the subject-based
//! messaging abstraction the store consumes (`transport`), and two transport
//! implementations: TCP with length-prefixed postcard frames (`tcp`) for
//! deployments, and an in-process mesh with link-failure injection (`memory`)
//! for tests and simulations.

pub mod cluster;
pub mod framing;
pub mod memory;
pub mod tcp;
pub mod transport;

pub use cluster::{ClusterMembership, ControllerNode, NodeId, StaticMembership};
pub use memory::{MemoryMesh, MemoryTransport};
pub use tcp::TcpTransport;
pub use transport::{
    ClusterMessage, ClusterTransport, MessageHandler, MessageSubject, TransportError,
};
