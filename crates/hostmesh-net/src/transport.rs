//! Subject-based cluster messaging abstraction
//!
//! The store consumes this interface only: broadcast and unicast of opaque
//! byte payloads under stable subjects, plus subject subscription. Delivery
//! is best-effort; messages may be lost, reordered, or duplicated.

use crate::cluster::NodeId;
use crate::framing::FrameError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    #[error("serialization error: {0}")]
    Serialization(#[from] postcard::Error),
    #[error("unknown peer: {0}")]
    PeerNotFound(NodeId),
    #[error("peer unreachable: {0}")]
    Unreachable(NodeId),
    #[error("connection closed")]
    ConnectionClosed,
}

/// A stable message subject. Subjects name a message stream; their string
/// values must match across the cluster.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageSubject(pub Cow<'static, str>);

impl MessageSubject {
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl fmt::Display for MessageSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An addressed message as it travels between nodes. This is also the wire
/// envelope: the TCP transport postcard-encodes it verbatim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterMessage {
    pub sender: NodeId,
    pub subject: MessageSubject,
    pub payload: Vec<u8>,
}

impl ClusterMessage {
    pub fn new(sender: NodeId, subject: MessageSubject, payload: Vec<u8>) -> Self {
        Self {
            sender,
            subject,
            payload,
        }
    }
}

/// Callback for inbound messages on a subscribed subject. Handlers run on the
/// transport's receive path and must not block; hand work off to a queue.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, message: ClusterMessage);
}

/// Cluster-wide messaging: best-effort broadcast and unicast of opaque
/// payloads, with subject-based subscription for the receive side.
pub trait ClusterTransport: Send + Sync {
    /// Send to every other node. Best-effort: per-peer failures are logged
    /// and do not fail the call.
    fn broadcast(&self, subject: MessageSubject, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Send to a single node.
    fn unicast(
        &self,
        to: &NodeId,
        subject: MessageSubject,
        payload: Vec<u8>,
    ) -> Result<(), TransportError>;

    /// Register the handler for a subject, replacing any previous one.
    fn add_subscriber(&self, subject: MessageSubject, handler: Arc<dyn MessageHandler>);

    /// Drop the handler for a subject; later messages on it are discarded.
    fn remove_subscriber(&self, subject: &MessageSubject);
}
