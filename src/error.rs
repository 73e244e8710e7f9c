//! Error types for Ticket Relay.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Record store errors.
///
/// Any of these aborts the current event's handling entirely; the store
/// write path is all-or-nothing, so a failed save never leaves a partial
/// document behind.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read ticket store: {0}")]
    Read(String),

    #[error("Failed to write ticket store: {0}")]
    Write(String),

    #[error("Failed to serialize ticket store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Transport-related errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on transport {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Ticket lifecycle outcomes.
///
/// Apart from `Store`, these are expected conditions the router surfaces
/// as reply text — they never escalate past the current event.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Ticket #{0} not found")]
    NotFound(u64),

    #[error("Ticket #{0} is closed")]
    Closed(u64),

    #[error("Ticket #{0} is already closed")]
    AlreadyClosed(u64),

    #[error("No ticket associated with this reply")]
    CorrelationFailed,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
