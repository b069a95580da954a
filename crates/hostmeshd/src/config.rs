//! Configuration for hostmeshd

use crate::gossip::GossipOptions;
use anyhow::Context;
use clap::Parser;
use hostmesh_net::ControllerNode;
use std::net::SocketAddr;
use std::time::Duration;

/// hostmeshd - replicated host inventory daemon
#[derive(Parser, Debug, Clone)]
#[command(name = "hostmeshd")]
#[command(about = "Replicated end-station host inventory daemon")]
pub struct Config {
    /// Node identity within the cluster
    #[arg(long, env = "HOSTMESH_NODE_ID")]
    pub node_id: String,

    /// Listen address for cluster messaging
    #[arg(short, long, default_value = "0.0.0.0:9380")]
    pub listen: SocketAddr,

    /// Cluster peers as id=host:port pairs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub peer: Vec<String>,

    /// Expected number of hosts (map capacity hint)
    #[arg(long, default_value = "10000")]
    pub hosts_expected: usize,

    /// Seconds before the first anti-entropy advertisement
    #[arg(long, default_value = "5")]
    pub anti_entropy_initial_delay_secs: u64,

    /// Seconds between anti-entropy advertisements
    #[arg(long, default_value = "5")]
    pub anti_entropy_period_secs: u64,

    /// Seconds granted to background workers on shutdown
    #[arg(long, default_value = "5")]
    pub shutdown_grace_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node_id.is_empty() {
            anyhow::bail!("node id cannot be empty");
        }
        if self.anti_entropy_period_secs == 0 {
            anyhow::bail!("anti-entropy period must be positive");
        }
        if self.log_format != "pretty" && self.log_format != "json" {
            anyhow::bail!("log format must be pretty or json");
        }
        self.peers()?;
        Ok(())
    }

    /// Parse the `--peer id=host:port` entries.
    pub fn peers(&self) -> anyhow::Result<Vec<ControllerNode>> {
        let mut nodes = Vec::with_capacity(self.peer.len());
        for entry in &self.peer {
            let (id, addr) = entry
                .split_once('=')
                .with_context(|| format!("malformed peer {entry:?}, expected id=host:port"))?;
            if id.is_empty() {
                anyhow::bail!("malformed peer {entry:?}, empty node id");
            }
            let addr: SocketAddr = addr
                .parse()
                .with_context(|| format!("malformed peer address in {entry:?}"))?;
            nodes.push(ControllerNode::new(id, addr));
        }
        Ok(nodes)
    }

    pub fn gossip_options(&self) -> GossipOptions {
        GossipOptions {
            anti_entropy_initial_delay: Duration::from_secs(self.anti_entropy_initial_delay_secs),
            anti_entropy_period: Duration::from_secs(self.anti_entropy_period_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
            hosts_expected: self.hosts_expected,
        }
    }
}
