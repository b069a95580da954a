//! hostmeshd - replicated end-station host inventory
//!
//! Every controller node keeps a full local copy of the host inventory.
//! Updates originate anywhere, propagate by best-effort broadcast, and
//! converge through periodic push-style anti-entropy. Per host, the update
//! with the largest logical timestamp wins everywhere; deletions leave
//! tombstones so stale updates cannot resurrect a removed host. Queries are
//! answered locally with no cross-node coordination.

pub mod bindings;
pub mod clock;
pub mod config;
pub mod gossip;
pub mod messages;
pub mod store;

pub use bindings::AddressBindings;
pub use clock::HostClock;
pub use config::Config;
pub use gossip::{GossipEngine, GossipOptions};
pub use store::HostStore;
