//! `relaykey-transport` — the messaging collaborator carrying actuation
//! commands to physical devices.
//!
//! The core only ever sees [`CommandTransport::publish`]; which broker sits
//! behind it (an in-memory sink for dev/test, MQTT in production) is wiring.

pub mod in_memory;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod publish;
pub mod targets;

pub use in_memory::InMemoryTransport;
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, MqttTransportConfig};
pub use publish::{CommandTransport, TransportError};
pub use targets::{PayloadEncoding, RelayCommand, TargetRegistry, TargetSpec};
