//! In-process cluster transport for tests and simulations
//!
//! A `MemoryMesh` connects any number of `MemoryTransport` endpoints living
//! in the same process. Delivery is synchronous on the sender's thread.
//! Individual links can be failed to script lost broadcasts and partitions.

use crate::cluster::NodeId;
use crate::transport::{
    ClusterMessage, ClusterTransport, MessageHandler, MessageSubject, TransportError,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

type Subscribers = RwLock<HashMap<MessageSubject, Arc<dyn MessageHandler>>>;

/// A process-local mesh of transport endpoints.
pub struct MemoryMesh {
    nodes: RwLock<HashMap<NodeId, Arc<Subscribers>>>,
    down: RwLock<HashSet<(NodeId, NodeId)>>,
}

impl MemoryMesh {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: RwLock::new(HashMap::new()),
            down: RwLock::new(HashSet::new()),
        })
    }

    /// Attach a new endpoint to the mesh.
    pub fn join(self: &Arc<Self>, id: NodeId) -> Arc<MemoryTransport> {
        let subscribers = Arc::new(RwLock::new(HashMap::new()));
        self.nodes.write().insert(id.clone(), subscribers.clone());
        Arc::new(MemoryTransport {
            local: id,
            mesh: Arc::clone(self),
            subscribers,
        })
    }

    /// Fail or restore the link between two nodes (both directions).
    pub fn set_link(&self, a: &NodeId, b: &NodeId, up: bool) {
        let mut down = self.down.write();
        if up {
            down.remove(&(a.clone(), b.clone()));
            down.remove(&(b.clone(), a.clone()));
        } else {
            down.insert((a.clone(), b.clone()));
            down.insert((b.clone(), a.clone()));
        }
    }

    fn link_up(&self, from: &NodeId, to: &NodeId) -> bool {
        !self.down.read().contains(&(from.clone(), to.clone()))
    }

    fn handler_for(&self, node: &NodeId, subject: &MessageSubject) -> Option<Arc<dyn MessageHandler>> {
        let subscribers = self.nodes.read().get(node)?.clone();
        let handler = subscribers.read().get(subject).cloned();
        handler
    }
}

/// One endpoint of a `MemoryMesh`.
pub struct MemoryTransport {
    local: NodeId,
    mesh: Arc<MemoryMesh>,
    subscribers: Arc<Subscribers>,
}

impl MemoryTransport {
    pub fn local(&self) -> &NodeId {
        &self.local
    }
}

impl ClusterTransport for MemoryTransport {
    fn broadcast(&self, subject: MessageSubject, payload: Vec<u8>) -> Result<(), TransportError> {
        let targets: Vec<NodeId> = self
            .mesh
            .nodes
            .read()
            .keys()
            .filter(|id| **id != self.local)
            .cloned()
            .collect();

        for target in targets {
            if !self.mesh.link_up(&self.local, &target) {
                debug!(%target, "dropping broadcast on failed link");
                continue;
            }
            if let Some(handler) = self.mesh.handler_for(&target, &subject) {
                handler.handle(ClusterMessage::new(
                    self.local.clone(),
                    subject.clone(),
                    payload.clone(),
                ));
            }
        }
        Ok(())
    }

    fn unicast(
        &self,
        to: &NodeId,
        subject: MessageSubject,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        if !self.mesh.nodes.read().contains_key(to) {
            return Err(TransportError::PeerNotFound(to.clone()));
        }
        if !self.mesh.link_up(&self.local, to) {
            return Err(TransportError::Unreachable(to.clone()));
        }
        if let Some(handler) = self.mesh.handler_for(to, &subject) {
            handler.handle(ClusterMessage::new(self.local.clone(), subject, payload));
        }
        Ok(())
    }

    fn add_subscriber(&self, subject: MessageSubject, handler: Arc<dyn MessageHandler>) {
        self.subscribers.write().insert(subject, handler);
    }

    fn remove_subscriber(&self, subject: &MessageSubject) {
        self.subscribers.write().remove(subject);
    }
}
