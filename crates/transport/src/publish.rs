//! Transport publish abstraction (mechanics only).
//!
//! - **Transport-agnostic**: in-memory sink, MQTT broker, anything with
//!   fire-and-forget publish semantics.
//! - **At-least-once**: delivery guarantees are the broker's concern; the
//!   caller must tolerate duplicates on the actuator side.
//! - **Non-blocking**: `publish` enqueues and returns. Broker acknowledgment
//!   is asynchronous relative to the calling request; a failed publish is a
//!   terminal result for that dispatch attempt, never an internal retry loop.

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The message could not be handed to the broker.
    #[error("transport publish failed: {0}")]
    Publish(String),

    /// The transport is not in a state that accepts messages
    /// (disconnected, outbound queue full).
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Outbound command publisher.
///
/// Implementations must be safe to share across request handlers; `publish`
/// is called outside any store lock and may fail independently of code state.
pub trait CommandTransport: Send + Sync {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

impl<T> CommandTransport for Arc<T>
where
    T: CommandTransport + ?Sized,
{
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        (**self).publish(topic, payload)
    }
}
