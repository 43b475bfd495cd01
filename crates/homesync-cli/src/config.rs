//! Runtime configuration, loaded from an optional TOML file with CLI flag
//! overrides applied on top.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use homesync_devices::MqttConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub broker: MqttConfig,
    pub storage: StorageConfig,
    pub simulators: SimulatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/homesync.redb"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, or fall back to defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 5050);
        assert!(config.simulators.enabled);
        assert_eq!(config.simulators.interval_secs, 5);
        assert_eq!(config.broker.port, 1883);
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [http]
            port = 8080

            [broker]
            broker = "mqtt.local"
            port = 1884
            "#,
        )
        .unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.broker.full_broker_addr(), "mqtt.local:1884");
        // Unspecified sections keep their defaults.
        assert!(config.simulators.enabled);
    }
}
