//! MQTT-backed transport (at-least-once delivery via QoS 1).
//!
//! The broker connection is driven by a background thread; `publish` only
//! enqueues into the client's outbound queue and returns, so a slow or
//! unreachable broker can never stall request handling. Connection-level TLS
//! (`mqtts`) is a deployment concern configured at the broker listener;
//! payload encryption is explicitly out of scope.

use std::thread;
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use tracing::{debug, info, warn};

use crate::publish::{CommandTransport, TransportError};

/// Broker connection settings, read from the environment by the caller.
#[derive(Debug, Clone)]
pub struct MqttTransportConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl MqttTransportConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            client_id: "relaykey".to_string(),
            keep_alive: Duration::from_secs(30),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

/// Publishes actuation commands to an MQTT broker.
pub struct MqttTransport {
    client: Client,
}

impl MqttTransport {
    /// Create the client and spawn the connection-driving thread.
    ///
    /// The connection is established lazily and re-established by the event
    /// loop after errors; publishes enqueued meanwhile are flushed once the
    /// broker is reachable again (up to the client's queue capacity).
    pub fn connect(config: MqttTransportConfig) -> Self {
        let mut options = MqttOptions::new(config.client_id, config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        if let (Some(user), Some(pass)) = (config.username, config.password) {
            options.set_credentials(user, pass);
        }

        let (client, mut connection) = Client::new(options, 64);

        thread::Builder::new()
            .name("mqtt-transport".to_string())
            .spawn(move || {
                for event in connection.iter() {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            info!("connected to mqtt broker");
                        }
                        Ok(Event::Incoming(Packet::PubAck(ack))) => {
                            debug!(pkid = ack.pkid, "broker acknowledged publish");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "mqtt connection error; retrying");
                            thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            })
            .expect("failed to spawn mqtt connection thread");

        Self { client }
    }
}

impl CommandTransport for MqttTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| TransportError::Unavailable(e.to_string()))
    }
}
