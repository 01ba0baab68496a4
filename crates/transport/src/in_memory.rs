//! In-memory transport for tests/dev.

use std::sync::{Mutex, PoisonError};

use crate::publish::{CommandTransport, TransportError};

/// A message accepted by the in-memory transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: String,
}

/// In-memory publish sink.
///
/// - No IO / no async
/// - Records every accepted message in order
/// - Can be armed to fail the next publish, for exercising the
///   transport-failure path
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    published: Mutex<Vec<PublishedMessage>>,
    fail_next: Mutex<Option<String>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot failure: the next `publish` returns the given error
    /// message, subsequent publishes succeed again.
    pub fn fail_next(&self, reason: impl Into<String>) {
        *self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    /// Everything accepted so far, in publish order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandTransport for InMemoryTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if let Some(reason) = self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(TransportError::Publish(reason));
        }

        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PublishedMessage {
                topic: topic.to_string(),
                payload: payload.to_string(),
            });
        Ok(())
    }
}
