//! Cluster node identity and membership

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Identity of a controller node, assigned by the operator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member of the controller cluster.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControllerNode {
    pub id: NodeId,
    pub addr: SocketAddr,
}

impl ControllerNode {
    pub fn new(id: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            id: NodeId::new(id),
            addr,
        }
    }
}

/// Read access to the current cluster membership. The node set includes the
/// local node itself.
pub trait ClusterMembership: Send + Sync {
    fn local_node(&self) -> NodeId;
    fn nodes(&self) -> Vec<ControllerNode>;
}

/// Membership fixed at startup from configuration.
pub struct StaticMembership {
    local: ControllerNode,
    nodes: Vec<ControllerNode>,
}

impl StaticMembership {
    pub fn new(local: ControllerNode, peers: Vec<ControllerNode>) -> Self {
        let mut nodes = Vec::with_capacity(peers.len() + 1);
        nodes.push(local.clone());
        nodes.extend(peers);
        Self { local, nodes }
    }
}

impl ClusterMembership for StaticMembership {
    fn local_node(&self) -> NodeId {
        self.local.id.clone()
    }

    fn nodes(&self) -> Vec<ControllerNode> {
        self.nodes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_membership_includes_self() {
        let local = ControllerNode::new("n1", "127.0.0.1:9380".parse().unwrap());
        let peer = ControllerNode::new("n2", "127.0.0.1:9381".parse().unwrap());
        let membership = StaticMembership::new(local, vec![peer]);

        assert_eq!(membership.local_node(), NodeId::new("n1"));
        let ids: Vec<_> = membership.nodes().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId::new("n1"), NodeId::new("n2")]);
    }
}
