//! Logical time for last-writer-wins ordering.
//!
//! Timestamps are totally ordered; only comparisons between timestamps issued
//! for the same host key are meaningful to the replication protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A logical timestamp: wall-clock milliseconds plus a tie-breaking counter
/// for multiple issues within the same millisecond. Ordering is lexicographic
/// over (millis, counter), which the derive provides.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Timestamp {
    pub unix_millis: u64,
    pub counter: u32,
}

impl Timestamp {
    pub fn new(unix_millis: u64, counter: u32) -> Self {
        Self {
            unix_millis,
            counter,
        }
    }

    /// Timestamp for the current wall-clock instant.
    pub fn now() -> Self {
        let unix_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            unix_millis,
            counter: 0,
        }
    }

    /// The immediately following timestamp within the same millisecond.
    pub fn next(self) -> Self {
        Self {
            unix_millis: self.unix_millis,
            counter: self.counter + 1,
        }
    }

    /// Strictly-newer comparison. Equal timestamps are not newer.
    pub fn is_newer(&self, other: &Timestamp) -> bool {
        self > other
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unix_millis, self.counter)
    }
}

/// A value paired with the timestamp at which it was observed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamped<T> {
    value: T,
    timestamp: Timestamp,
}

impl<T> Timestamped<T> {
    pub fn new(value: T, timestamp: Timestamp) -> Self {
        Self { value, timestamp }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Whether this record is strictly newer than the given timestamp.
    pub fn is_newer(&self, timestamp: &Timestamp) -> bool {
        self.timestamp.is_newer(timestamp)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
