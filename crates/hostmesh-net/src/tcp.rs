//! TCP cluster transport
//!
//! Each node listens on its configured address and keeps one lazily connected
//! outbound link per peer. Sends enqueue onto the link and never block the
//! caller; a writer task per link connects on demand and reconnects after
//! failures. Delivery is best-effort: a message queued while the peer is down
//! is dropped, and anti-entropy is expected to repair the gap.

use crate::cluster::{ControllerNode, NodeId};
use crate::framing::FrameCodec;
use crate::transport::{
    ClusterMessage, ClusterTransport, MessageHandler, MessageSubject, TransportError,
};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

struct PeerLink {
    tx: mpsc::UnboundedSender<ClusterMessage>,
    // Taken by serve() when the writer task starts
    rx: Mutex<Option<mpsc::UnboundedReceiver<ClusterMessage>>>,
    addr: SocketAddr,
}

/// TCP implementation of `ClusterTransport`.
pub struct TcpTransport {
    local: NodeId,
    listen: SocketAddr,
    links: HashMap<NodeId, PeerLink>,
    subscribers: RwLock<HashMap<MessageSubject, Arc<dyn MessageHandler>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl TcpTransport {
    /// Create a transport for `local`, listening on `listen`, with outbound
    /// links to the given peers.
    pub fn new(
        local: NodeId,
        listen: SocketAddr,
        peers: impl IntoIterator<Item = ControllerNode>,
    ) -> Self {
        let mut links = HashMap::new();
        for peer in peers {
            if peer.id == local {
                continue;
            }
            let (tx, rx) = mpsc::unbounded_channel();
            links.insert(
                peer.id,
                PeerLink {
                    tx,
                    rx: Mutex::new(Some(rx)),
                    addr: peer.addr,
                },
            );
        }
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            local,
            listen,
            links,
            subscribers: RwLock::new(HashMap::new()),
            shutdown_tx,
        }
    }

    /// Run the listener and the per-peer writer tasks until `shutdown`.
    pub async fn serve(self: Arc<Self>) -> Result<(), TransportError> {
        for (peer, link) in &self.links {
            if let Some(rx) = link.rx.lock().take() {
                tokio::spawn(run_outbound(
                    peer.clone(),
                    link.addr,
                    rx,
                    self.shutdown_tx.subscribe(),
                ));
            }
        }

        let listener = TcpListener::bind(self.listen).await?;
        info!(node = %self.local, "cluster transport listening on {}", self.listen);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("accepted cluster connection from {}", addr);
                            let transport = self.clone();
                            tokio::spawn(transport.run_inbound(stream, addr));
                        }
                        Err(e) => warn!("accept error: {}", e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!(node = %self.local, "cluster transport stopping");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Stop the listener and all link tasks.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    async fn run_inbound(self: Arc<Self>, stream: TcpStream, addr: SocketAddr) {
        let mut frames = FramedRead::new(stream, FrameCodec::new());
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                frame = frames.next() => {
                    match frame {
                        Some(Ok(bytes)) => match postcard::from_bytes::<ClusterMessage>(&bytes) {
                            Ok(message) => self.dispatch(message),
                            Err(e) => warn!("dropping undecodable message from {}: {}", addr, e),
                        },
                        Some(Err(e)) => {
                            debug!("frame error from {}: {}", addr, e);
                            break;
                        }
                        None => break,
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    }

    fn dispatch(&self, message: ClusterMessage) {
        let handler = self.subscribers.read().get(&message.subject).cloned();
        match handler {
            Some(handler) => handler.handle(message),
            None => debug!(subject = %message.subject, "no subscriber, discarding"),
        }
    }

    fn enqueue(&self, to: &NodeId, message: ClusterMessage) -> Result<(), TransportError> {
        let link = self
            .links
            .get(to)
            .ok_or_else(|| TransportError::PeerNotFound(to.clone()))?;
        link.tx
            .send(message)
            .map_err(|_| TransportError::ConnectionClosed)
    }
}

impl ClusterTransport for TcpTransport {
    fn broadcast(&self, subject: MessageSubject, payload: Vec<u8>) -> Result<(), TransportError> {
        for peer in self.links.keys() {
            let message =
                ClusterMessage::new(self.local.clone(), subject.clone(), payload.clone());
            if let Err(e) = self.enqueue(peer, message) {
                debug!(%peer, "broadcast enqueue failed: {}", e);
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
        self.enqueue(to, ClusterMessage::new(self.local.clone(), subject, payload))
    }

    fn add_subscriber(&self, subject: MessageSubject, handler: Arc<dyn MessageHandler>) {
        self.subscribers.write().insert(subject, handler);
    }

    fn remove_subscriber(&self, subject: &MessageSubject) {
        self.subscribers.write().remove(subject);
    }
}

/// Writer task for one outbound link: connect on demand, write queued frames,
/// drop the frame and the connection on failure.
async fn run_outbound(
    peer: NodeId,
    addr: SocketAddr,
    mut rx: mpsc::UnboundedReceiver<ClusterMessage>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut sink: Option<FramedWrite<TcpStream, FrameCodec>> = None;
    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                let bytes = match postcard::to_allocvec(&message) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(%peer, "failed to encode message: {}", e);
                        continue;
                    }
                };

                if sink.is_none() {
                    match TcpStream::connect(addr).await {
                        Ok(stream) => sink = Some(FramedWrite::new(stream, FrameCodec::new())),
                        Err(e) => {
                            debug!(%peer, "connect failed, dropping message: {}", e);
                            continue;
                        }
                    }
                }

                if let Some(writer) = sink.as_mut() {
                    if let Err(e) = writer.send(bytes).await {
                        debug!(%peer, "send failed, dropping connection: {}", e);
                        sink = None;
                    }
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}
