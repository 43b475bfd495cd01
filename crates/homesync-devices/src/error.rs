//! Error types for the device crate.

use thiserror::Error;

/// Result type for broker adapter operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Broker adapter error types. None of these are fatal to the process; a
/// degraded broker leaves control actions working against the store alone.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The client has no live broker connection.
    #[error("broker not connected")]
    NotConnected,

    /// Connection-level failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Subscribe request failed.
    #[error("subscribe error: {0}")]
    Subscription(String),

    /// Publish request failed.
    #[error("publish error: {0}")]
    Publish(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Control gateway error types, mapped onto HTTP responses by the API
/// layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Device identifier outside the fixed fleet.
    #[error("no device found with name {0}")]
    DeviceNotFound(String),

    /// Action outside the control vocabulary.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Mode outside {auto, manual} (or override outside {on, off}).
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Required request field absent.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// Persistence failure; no partial mutation is left visible.
    #[error(transparent)]
    Storage(#[from] homesync_storage::Error),
}
