//! Error types for hostmesh

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// hostmesh error types
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    /// Malformed MAC address text
    #[error("invalid mac address: {0}")]
    InvalidMac(String),

    /// Malformed host identifier text
    #[error("invalid host id: {0}")]
    InvalidHostId(String),

    /// Malformed connect point text
    #[error("invalid connect point: {0}")]
    InvalidConnectPoint(String),
}
