//! Host inventory events delivered to the upstream delegate.

use crate::types::Host;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of state transition an event describes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    /// A host was learned for the first time (or re-learned after removal).
    Added,
    /// A host moved to a different connect point.
    Moved,
    /// A host gained IP addresses or annotations; location unchanged.
    Updated,
    /// A host was removed from the inventory.
    Removed,
}

impl fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostEventKind::Added => "added",
            HostEventKind::Moved => "moved",
            HostEventKind::Updated => "updated",
            HostEventKind::Removed => "removed",
        };
        write!(f, "{s}")
    }
}

/// A host state transition, carrying the host snapshot after the transition
/// (for removals, the last live snapshot).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostEvent {
    pub kind: HostEventKind,
    pub host: Host,
}

impl HostEvent {
    pub fn new(kind: HostEventKind, host: Host) -> Self {
        Self { kind, host }
    }
}

/// Receiver for events produced by peer messages and anti-entropy. Local
/// mutations return their event to the caller instead; the delegate only sees
/// real state transitions, never no-ops.
pub trait HostStoreDelegate: Send + Sync {
    fn notify(&self, event: HostEvent);
}
