//! Environment-based configuration for the API process.
//!
//! Everything the core needs from the outside world (reaper interval, broker
//! coordinates, JWT secret) is read here, once, at startup.

use std::time::Duration;

/// MQTT broker settings (only consumed when the `mqtt` feature is enabled
/// and `USE_MQTT_TRANSPORT=true`).
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub reaper_interval: Duration,
    pub use_mqtt: bool,
    pub mqtt: Option<MqttSettings>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let reaper_interval = std::env::var("REAPER_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        let use_mqtt = std::env::var("USE_MQTT_TRANSPORT")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let mqtt = std::env::var("MQTT_HOST").ok().map(|host| MqttSettings {
            host,
            port: std::env::var("MQTT_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8883),
            username: std::env::var("MQTT_USER").ok(),
            password: std::env::var("MQTT_PASS").ok(),
            client_id: std::env::var("MQTT_CLIENT_ID")
                .unwrap_or_else(|_| "relaykey-api".to_string()),
        });

        Self {
            bind_addr,
            jwt_secret,
            reaper_interval,
            use_mqtt,
            mqtt,
        }
    }
}

impl Default for ApiConfig {
    /// In-memory everything; the configuration tests and dev runs start from.
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "dev-secret".to_string(),
            reaper_interval: Duration::from_secs(60),
            use_mqtt: false,
            mqtt: None,
        }
    }
}
