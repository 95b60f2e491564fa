//! Bootstrap fetch configuration.

use serde::Deserialize;

/// Configuration for the HTTP device source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Base URL of the backend API; devices are read from `<api_url>/api/devices`.
    pub api_url: String,
    /// Number of fetch attempts before giving up.
    pub retries: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5200".to_string(),
            retries: 5,
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = BootstrapConfig::default();
        assert_eq!(config.api_url, "http://localhost:5200");
        assert_eq!(config.retries, 5);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: BootstrapConfig = toml::from_str(r#"api_url = "http://backend:8080""#).unwrap();
        assert_eq!(config.api_url, "http://backend:8080");
        assert_eq!(config.retries, 5);
    }
}
