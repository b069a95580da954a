//! hostmeshd - replicated host inventory daemon
//!
//! Joins the controller cluster over TCP, replicates the host inventory with
//! gossip and anti-entropy, and logs inventory transitions.

use clap::Parser;
use hostmesh_core::{HostEvent, HostStoreDelegate};
use hostmesh_net::{ControllerNode, NodeId, StaticMembership, TcpTransport};
use hostmeshd::config::Config;
use hostmeshd::gossip::GossipEngine;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs every peer-driven inventory transition.
struct LogDelegate;

impl HostStoreDelegate for LogDelegate {
    fn notify(&self, event: HostEvent) {
        info!(
            host = %event.host.id,
            kind = %event.kind,
            location = %event.host.location,
            "host inventory changed"
        );
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    let default_level = if config.verbose {
        "hostmeshd=debug"
    } else {
        "hostmeshd=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(default_level.parse().unwrap());
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    if let Err(e) = config.validate() {
        error!("invalid configuration: {e:#}");
        return ExitCode::FAILURE;
    }

    info!("hostmeshd v{}", env!("CARGO_PKG_VERSION"));

    let peers = match config.peers() {
        Ok(peers) => peers,
        Err(e) => {
            error!("invalid peer configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let local = ControllerNode::new(config.node_id.clone(), config.listen);
    let membership = Arc::new(StaticMembership::new(local, peers.clone()));
    let transport = Arc::new(TcpTransport::new(
        NodeId::new(config.node_id.clone()),
        config.listen,
        peers,
    ));

    let engine = GossipEngine::new(transport.clone(), membership, config.gossip_options());
    engine.set_delegate(Arc::new(LogDelegate));

    let server = tokio::spawn(transport.clone().serve());
    engine.start();

    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal");

    engine.stop().await;
    transport.shutdown();
    match server.await {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("transport error: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("transport task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
