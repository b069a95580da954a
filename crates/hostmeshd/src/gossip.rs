//! Gossip replication engine
//!
//! Wires the host table to the cluster: subscribes the three message
//! subjects, broadcasts local mutations, answers anti-entropy advertisements,
//! and runs the periodic advertisement task. Peer update/remove messages are
//! handled on an elastic foreground lane (one task per message);
//! advertisements are reconciled serially on a single background worker so at
//! most one full-state scan runs at a time. Transport callbacks only enqueue
//! and never block.

use crate::bindings::AddressBindings;
use crate::clock::HostClock;
use crate::messages::{
    AntiEntropyAdvertisement, HostRemoved, HostUpdate, HOST_ANTI_ENTROPY_ADVERTISEMENT,
    HOST_REMOVED, HOST_UPDATED,
};
use crate::store::HostStore;
use hostmesh_core::{
    ConnectPoint, DeviceId, Host, HostDescription, HostEvent, HostId, HostStoreDelegate, MacAddr,
    PortAddresses, ProviderId, VlanId,
};
use hostmesh_net::{
    ClusterMembership, ClusterMessage, ClusterTransport, MessageHandler, MessageSubject, NodeId,
    TransportError,
};
use parking_lot::{Mutex, RwLock};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant};
use tracing::{debug, error, info, trace, warn};

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct GossipOptions {
    /// Delay before the first anti-entropy advertisement.
    pub anti_entropy_initial_delay: Duration,
    /// Interval between anti-entropy advertisements.
    pub anti_entropy_period: Duration,
    /// Time granted to the worker lanes to drain on shutdown.
    pub shutdown_grace: Duration,
    /// Expected number of hosts (map capacity hint).
    pub hosts_expected: usize,
}

impl Default for GossipOptions {
    fn default() -> Self {
        Self {
            anti_entropy_initial_delay: Duration::from_secs(5),
            anti_entropy_period: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(5),
            hosts_expected: 10_000,
        }
    }
}

/// Counters exposed for observability.
#[derive(Clone, Debug)]
pub struct StoreStats {
    pub hosts: usize,
    pub tombstones: usize,
    pub bindings: usize,
}

struct Shared {
    store: HostStore,
    bindings: AddressBindings,
    clock: HostClock,
    transport: Arc<dyn ClusterTransport>,
    membership: Arc<dyn ClusterMembership>,
    delegate: RwLock<Option<Arc<dyn HostStoreDelegate>>>,
}

/// The replicated host store engine of one controller node.
pub struct GossipEngine {
    shared: Arc<Shared>,
    options: GossipOptions,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl GossipEngine {
    pub fn new(
        transport: Arc<dyn ClusterTransport>,
        membership: Arc<dyn ClusterMembership>,
        options: GossipOptions,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shared: Arc::new(Shared {
                store: HostStore::with_capacity(options.hosts_expected),
                bindings: AddressBindings::new(),
                clock: HostClock::new(),
                transport,
                membership,
                delegate: RwLock::new(None),
            }),
            options,
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Install the receiver for peer-driven events.
    pub fn set_delegate(&self, delegate: Arc<dyn HostStoreDelegate>) {
        *self.shared.delegate.write() = Some(delegate);
    }

    pub fn clear_delegate(&self) {
        *self.shared.delegate.write() = None;
    }

    /// Subscribe the message subjects and spawn the worker lanes and the
    /// periodic advertisement task. Must run inside a tokio runtime.
    pub fn start(&self) {
        let (fg_tx, fg_rx) = mpsc::unbounded_channel();
        let (bg_tx, bg_rx) = mpsc::unbounded_channel();

        self.shared.transport.add_subscriber(
            HOST_UPDATED,
            Arc::new(UpdateListener { tx: fg_tx.clone() }),
        );
        self.shared
            .transport
            .add_subscriber(HOST_REMOVED, Arc::new(RemovedListener { tx: fg_tx }));
        self.shared.transport.add_subscriber(
            HOST_ANTI_ENTROPY_ADVERTISEMENT,
            Arc::new(AdvertisementListener { tx: bg_tx }),
        );

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(run_foreground(
            self.shared.clone(),
            fg_rx,
            self.shutdown_tx.subscribe(),
        )));
        tasks.push(tokio::spawn(run_background(
            self.shared.clone(),
            bg_rx,
            self.shutdown_tx.subscribe(),
        )));
        tasks.push(tokio::spawn(run_advertiser(
            self.shared.clone(),
            self.options.clone(),
            self.shutdown_tx.subscribe(),
        )));

        info!("host store started");
    }

    /// Unsubscribe, drain the workers within the shutdown grace, and clear
    /// all in-memory state.
    pub async fn stop(&self) {
        self.shared.transport.remove_subscriber(&HOST_UPDATED);
        self.shared.transport.remove_subscriber(&HOST_REMOVED);
        self.shared
            .transport
            .remove_subscriber(&HOST_ANTI_ENTROPY_ADVERTISEMENT);

        let _ = self.shutdown_tx.send(());
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for mut task in tasks {
            if timeout(self.options.shutdown_grace, &mut task).await.is_err() {
                error!("timeout draining worker, aborting");
                task.abort();
            }
        }

        self.shared.store.clear();
        self.shared.bindings.clear_all();
        info!("host store stopped");
    }

    // -------------------------------------------------------------------------
    // Local mutation API
    // -------------------------------------------------------------------------

    /// Apply a local host observation and notify peers of the change, if any.
    /// The resulting event is returned to the caller; peers learn it via
    /// broadcast, or via anti-entropy if the broadcast is lost.
    pub fn create_or_update_host(
        &self,
        provider_id: &ProviderId,
        host_id: &HostId,
        description: &HostDescription,
    ) -> Option<HostEvent> {
        let timestamp = self.shared.clock.timestamp(host_id);
        let event =
            self.shared
                .store
                .create_or_update(provider_id, host_id, description, timestamp);
        if event.is_some() {
            debug!(host = %host_id, "notifying peers of host update");
            let message = HostUpdate {
                provider_id: provider_id.clone(),
                host_id: *host_id,
                description: description.clone(),
                timestamp,
            };
            if let Err(e) = broadcast_message(&self.shared, HOST_UPDATED, &message) {
                warn!(host = %host_id, "failed to notify peers of host update: {}", e);
            }
        }
        event
    }

    /// Remove a host locally and notify peers, if it was present.
    pub fn remove_host(&self, host_id: &HostId) -> Option<HostEvent> {
        let timestamp = self.shared.clock.timestamp(host_id);
        let event = self.shared.store.remove(host_id, timestamp);
        if event.is_some() {
            debug!(host = %host_id, "notifying peers of host removal");
            let message = HostRemoved {
                host_id: *host_id,
                timestamp,
            };
            if let Err(e) = broadcast_message(&self.shared, HOST_REMOVED, &message) {
                warn!(host = %host_id, "failed to notify peers of host removal: {}", e);
            }
        }
        event
    }

    // -------------------------------------------------------------------------
    // Queries (local snapshots, no coordination)
    // -------------------------------------------------------------------------

    pub fn get_host(&self, host_id: &HostId) -> Option<Host> {
        self.shared.store.get(host_id)
    }

    pub fn hosts(&self) -> Vec<Host> {
        self.shared.store.hosts()
    }

    pub fn host_count(&self) -> usize {
        self.shared.store.host_count()
    }

    pub fn hosts_by_vlan(&self, vlan: VlanId) -> Vec<Host> {
        self.shared.store.hosts_by_vlan(vlan)
    }

    pub fn hosts_by_mac(&self, mac: MacAddr) -> Vec<Host> {
        self.shared.store.hosts_by_mac(mac)
    }

    pub fn hosts_by_ip(&self, ip: IpAddr) -> Vec<Host> {
        self.shared.store.hosts_by_ip(ip)
    }

    pub fn connected_hosts(&self, connect_point: &ConnectPoint) -> Vec<Host> {
        self.shared.store.connected_hosts(connect_point)
    }

    pub fn connected_hosts_on_device(&self, device: &DeviceId) -> Vec<Host> {
        self.shared.store.connected_hosts_on_device(device)
    }

    // -------------------------------------------------------------------------
    // Address bindings (adjunct local state)
    // -------------------------------------------------------------------------

    pub fn update_address_bindings(&self, addresses: PortAddresses) {
        self.shared.bindings.update(addresses);
    }

    pub fn remove_address_bindings(&self, addresses: &PortAddresses) {
        self.shared.bindings.remove(addresses);
    }

    pub fn clear_address_bindings(&self, connect_point: &ConnectPoint) {
        self.shared.bindings.clear(connect_point);
    }

    pub fn address_bindings(&self) -> Vec<PortAddresses> {
        self.shared.bindings.all()
    }

    pub fn address_bindings_for_port(&self, connect_point: &ConnectPoint) -> Vec<PortAddresses> {
        self.shared.bindings.for_port(connect_point)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            hosts: self.shared.store.host_count(),
            tombstones: self.shared.store.tombstone_count(),
            bindings: self.shared.bindings.len(),
        }
    }
}

// =============================================================================
// Message listeners: decode and enqueue, never block the transport
// =============================================================================

enum PeerCommand {
    Update(HostUpdate),
    Remove(HostRemoved),
}

struct UpdateListener {
    tx: mpsc::UnboundedSender<PeerCommand>,
}

impl MessageHandler for UpdateListener {
    fn handle(&self, message: ClusterMessage) {
        debug!(sender = %message.sender, "received host update from peer");
        match postcard::from_bytes::<HostUpdate>(&message.payload) {
            Ok(update) => {
                let _ = self.tx.send(PeerCommand::Update(update));
            }
            Err(e) => warn!(sender = %message.sender, "dropping undecodable host update: {}", e),
        }
    }
}

struct RemovedListener {
    tx: mpsc::UnboundedSender<PeerCommand>,
}

impl MessageHandler for RemovedListener {
    fn handle(&self, message: ClusterMessage) {
        debug!(sender = %message.sender, "received host removal from peer");
        match postcard::from_bytes::<HostRemoved>(&message.payload) {
            Ok(removed) => {
                let _ = self.tx.send(PeerCommand::Remove(removed));
            }
            Err(e) => warn!(sender = %message.sender, "dropping undecodable host removal: {}", e),
        }
    }
}

struct AdvertisementListener {
    tx: mpsc::UnboundedSender<AntiEntropyAdvertisement>,
}

impl MessageHandler for AdvertisementListener {
    fn handle(&self, message: ClusterMessage) {
        trace!(sender = %message.sender, "received anti-entropy advertisement");
        match postcard::from_bytes::<AntiEntropyAdvertisement>(&message.payload) {
            Ok(ad) => {
                let _ = self.tx.send(ad);
            }
            Err(e) => warn!(sender = %message.sender, "dropping undecodable advertisement: {}", e),
        }
    }
}

// =============================================================================
// Worker lanes
// =============================================================================

/// Foreground lane: elastic, one task per peer update/remove.
async fn run_foreground(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<PeerCommand>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                let shared = shared.clone();
                tokio::spawn(async move {
                    apply_peer_command(&shared, command);
                });
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}

fn apply_peer_command(shared: &Shared, command: PeerCommand) {
    let event = match command {
        PeerCommand::Update(update) => shared.store.create_or_update(
            &update.provider_id,
            &update.host_id,
            &update.description,
            update.timestamp,
        ),
        PeerCommand::Remove(removed) => shared.store.remove(&removed.host_id, removed.timestamp),
    };
    if let Some(event) = event {
        notify_delegate(shared, event);
    }
}

/// Background lane: advertisements reconcile serially, one at a time.
async fn run_background(
    shared: Arc<Shared>,
    mut rx: mpsc::UnboundedReceiver<AntiEntropyAdvertisement>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            ad = rx.recv() => {
                let Some(ad) = ad else { break };
                handle_advertisement(&shared, &ad);
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}

fn handle_advertisement(shared: &Shared, ad: &AntiEntropyAdvertisement) {
    let outcome = shared.store.reconcile(ad);
    for event in outcome.events {
        notify_delegate(shared, event);
    }
    for update in outcome.push_updates {
        if let Err(e) = unicast_message(shared, &ad.sender, HOST_UPDATED, &update) {
            debug!(peer = %ad.sender, "failed to push host update: {}", e);
        }
    }
    for removed in outcome.push_removes {
        if let Err(e) = unicast_message(shared, &ad.sender, HOST_REMOVED, &removed) {
            debug!(peer = %ad.sender, "failed to push host removal: {}", e);
        }
    }
}

/// Periodic task: advertise the full local digest to one random peer.
async fn run_advertiser(
    shared: Arc<Shared>,
    options: GossipOptions,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = interval_at(
        Instant::now() + options.anti_entropy_initial_delay,
        options.anti_entropy_period,
    );
    loop {
        tokio::select! {
            _ = ticker.tick() => send_advertisement(&shared),
            _ = shutdown_rx.recv() => break,
        }
    }
}

fn send_advertisement(shared: &Shared) {
    let local = shared.membership.local_node();
    let peers: Vec<NodeId> = shared
        .membership
        .nodes()
        .into_iter()
        .map(|node| node.id)
        .filter(|id| *id != local)
        .collect();

    let Some(peer) = peers.choose(&mut rand::thread_rng()) else {
        trace!("no other peers in the cluster");
        return;
    };

    let (timestamps, tombstones) = shared.store.digest();
    let ad = AntiEntropyAdvertisement {
        sender: local,
        timestamps,
        tombstones,
    };
    if let Err(e) = unicast_message(shared, peer, HOST_ANTI_ENTROPY_ADVERTISEMENT, &ad) {
        debug!(%peer, "failed to send anti-entropy advertisement: {}", e);
    }
}

fn notify_delegate(shared: &Shared, event: HostEvent) {
    let delegate = shared.delegate.read().clone();
    if let Some(delegate) = delegate {
        delegate.notify(event);
    }
}

fn broadcast_message<T: Serialize>(
    shared: &Shared,
    subject: MessageSubject,
    message: &T,
) -> Result<(), TransportError> {
    let payload = postcard::to_allocvec(message)?;
    shared.transport.broadcast(subject, payload)
}

fn unicast_message<T: Serialize>(
    shared: &Shared,
    to: &NodeId,
    subject: MessageSubject,
    message: &T,
) -> Result<(), TransportError> {
    let payload = postcard::to_allocvec(message)?;
    shared.transport.unicast(to, subject, payload)
}
