//! Infrastructure wiring: audit log, code store, transport, gate, reaper.

use std::sync::Arc;

use relaykey_audit::{AuditLog, InMemoryAuditLog};
use relaykey_codes::{CodeStore, ExpiryReaper, ReaperConfig, ReaperHandle};
use relaykey_gate::CommandGate;
use relaykey_transport::{CommandTransport, InMemoryTransport, TargetRegistry};

use crate::config::ApiConfig;

/// Everything the handlers need, plus the reaper handle so the background
/// sweep lives exactly as long as the application.
pub struct AppServices {
    pub store: Arc<CodeStore>,
    pub audit: Arc<dyn AuditLog>,
    pub gate: Arc<CommandGate>,
    _reaper: ReaperHandle,
}

/// Wire the core against the configured transport and start the reaper.
pub fn build_services(config: &ApiConfig) -> AppServices {
    let audit: Arc<dyn AuditLog> = Arc::new(InMemoryAuditLog::new());
    let store = Arc::new(CodeStore::new(audit.clone()));

    let transport = build_transport(config);

    let gate = Arc::new(CommandGate::new(
        store.clone(),
        audit.clone(),
        transport,
        TargetRegistry::default(),
    ));

    let reaper = ExpiryReaper::new(store.clone(), audit.clone())
        .spawn(ReaperConfig::default().with_interval(config.reaper_interval));

    AppServices {
        store,
        audit,
        gate,
        _reaper: reaper,
    }
}

#[cfg(feature = "mqtt")]
fn build_transport(config: &ApiConfig) -> Arc<dyn CommandTransport> {
    use relaykey_transport::{MqttTransport, MqttTransportConfig};

    if !config.use_mqtt {
        return Arc::new(InMemoryTransport::new());
    }

    let Some(mqtt) = &config.mqtt else {
        tracing::warn!("USE_MQTT_TRANSPORT=true but MQTT_HOST not set, falling back to in-memory");
        return Arc::new(InMemoryTransport::new());
    };

    let mut transport_config =
        MqttTransportConfig::new(mqtt.host.clone(), mqtt.port).with_client_id(mqtt.client_id.clone());
    if let (Some(user), Some(pass)) = (&mqtt.username, &mqtt.password) {
        transport_config = transport_config.with_credentials(user.clone(), pass.clone());
    }

    tracing::info!(host = %mqtt.host, port = mqtt.port, "using mqtt transport");
    Arc::new(MqttTransport::connect(transport_config))
}

#[cfg(not(feature = "mqtt"))]
fn build_transport(config: &ApiConfig) -> Arc<dyn CommandTransport> {
    if config.use_mqtt {
        tracing::warn!("USE_MQTT_TRANSPORT=true but mqtt feature not enabled, falling back to in-memory");
    }
    Arc::new(InMemoryTransport::new())
}
