//! MQTT broker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the broker client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// MQTT broker address
    pub broker: String,

    /// MQTT broker port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Client ID (auto-generated if not provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Username for authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Keep-alive interval in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u64,

    /// Topics subscribed on every (re)connect
    #[serde(default = "default_subscriptions")]
    pub subscribe_topics: Vec<String>,
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    60
}

/// Every topic the engine listens on: the device command topics plus the
/// telemetry streams.
pub fn default_subscriptions() -> Vec<String> {
    [
        "device/lighting",
        "device/water_heater",
        "device/camera",
        "device/fps",
        "device/surveillance_camera",
        "device/aircon",
        "device/temperature",
        "device/light_control",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

impl MqttConfig {
    pub fn new(broker: impl Into<String>) -> Self {
        Self {
            broker: broker.into(),
            port: default_port(),
            client_id: None,
            username: None,
            password: None,
            keep_alive: default_keep_alive(),
            subscribe_topics: default_subscriptions(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn full_broker_addr(&self) -> String {
        format!("{}:{}", self.broker, self.port)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self::new("localhost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.full_broker_addr(), "localhost:1883");
        assert_eq!(config.subscribe_topics.len(), 8);
    }

    #[test]
    fn test_builder() {
        let config = MqttConfig::new("broker.local")
            .with_port(1884)
            .with_auth("user", "pass");
        assert_eq!(config.full_broker_addr(), "broker.local:1884");
        assert_eq!(config.username.as_deref(), Some("user"));
    }
}
