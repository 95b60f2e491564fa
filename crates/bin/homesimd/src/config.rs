//! Daemon configuration.
//!
//! Read from an optional `homesim.toml` in the working directory, then
//! patched from the environment (`BROKER_HOST`, `BROKER_PORT`, `API_URL`,
//! `HOSTNAME`, `HOMESIM_TICK_INTERVAL_MS`, `HOMESIM_LOG`, `RUST_LOG`).

use std::time::Duration;

use serde::Deserialize;

use homesim_adapter_http::BootstrapConfig;
use homesim_adapter_mqtt::MqttConfig;
use homesim_app::protocol::SenderId;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and topic layout.
    pub mqtt: MqttConfig,
    /// Initial device fetch.
    pub bootstrap: BootstrapConfig,
    /// Tick loop settings.
    pub simulation: SimulationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Tick loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Milliseconds between two tick passes.
    pub tick_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
}

impl Config {
    /// Read `homesim.toml` when present, apply the environment on top and
    /// validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homesim.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("BROKER_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(port) = var("BROKER_PORT").and_then(|val| val.parse().ok()) {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = var("HOSTNAME") {
            self.mqtt.client_id = SenderId::for_host(&val).to_string();
        }
        if let Some(val) = var("API_URL") {
            self.bootstrap.api_url = val;
        }
        if let Some(ms) = var("HOMESIM_TICK_INTERVAL_MS").and_then(|val| val.parse().ok()) {
            self.simulation.tick_interval_ms = ms;
        }
        if let Some(val) = var("HOMESIM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation("broker port must be non-zero".to_string()));
        }
        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::Validation("tick interval must be non-zero".to_string()));
        }
        if self.mqtt.topic_root.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation("topic root must not be empty".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,rumqttc=warn".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("malformed homesim.toml")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("cannot read homesim.toml")]
    Io(#[from] std::io::Error),
    /// A value that parses but cannot run.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_tick_every_two_seconds_by_default() {
        let config = Config::default();
        assert_eq!(config.mqtt.topic_root, "project/home");
        assert_eq!(config.bootstrap.retries, 5);
        assert_eq!(config.simulation.tick_interval_ms, 2000);
        assert_eq!(config.tick_interval(), Duration::from_secs(2));
    }

    #[test]
    fn should_accept_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 2000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [mqtt]
            broker_host = 'broker.local'
            broker_port = 1884
            topic_root = 'lab/home'

            [bootstrap]
            api_url = 'http://backend:5200'
            retries = 3

            [simulation]
            tick_interval_ms = 500

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mqtt.broker_host, "broker.local");
        assert_eq!(config.mqtt.broker_port, 1884);
        assert_eq!(config.mqtt.topic_root, "lab/home");
        assert_eq!(config.bootstrap.api_url, "http://backend:5200");
        assert_eq!(config.bootstrap.retries, 3);
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_fall_back_to_defaults_without_file() {
        let config = Config::from_file("does-not-exist/homesim.toml").unwrap();
        assert_eq!(config.mqtt.broker_port, 1883);
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("BROKER_HOST", "mqtt"),
            ("BROKER_PORT", "1885"),
            ("HOSTNAME", "node-7"),
            ("API_URL", "http://api:80"),
            ("HOMESIM_TICK_INTERVAL_MS", "250"),
            ("HOMESIM_LOG", "debug"),
        ]));
        assert_eq!(config.mqtt.broker_host, "mqtt");
        assert_eq!(config.mqtt.broker_port, 1885);
        assert_eq!(config.mqtt.client_id, "simulator-node-7");
        assert_eq!(config.bootstrap.api_url, "http://api:80");
        assert_eq!(config.simulation.tick_interval_ms, 250);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_prefer_rust_log_over_homesim_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("HOMESIM_LOG", "debug"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_port() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("BROKER_PORT", "mqtt")]));
        assert_eq!(config.mqtt.broker_port, 1883);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.mqtt.broker_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_tick_interval() {
        let mut config = Config::default();
        config.simulation.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_topic_root() {
        let mut config = Config::default();
        config.mqtt.topic_root = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_malformed_toml() {
        assert!(toml::from_str::<Config>("[simulation]\ntick_interval_ms = 'fast'").is_err());
    }
}
