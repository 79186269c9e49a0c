//! Session configuration, loadable from TOML or built in code.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for one adapter session.
///
/// The config surface is deliberately small: per-command timeouts, which
/// probe ranges to scan, and the ECU-probe listen window. The PID descriptor
/// table is static and not configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Timeout for data-query commands, in milliseconds.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Timeout for adapter-configuration commands, in milliseconds.
    /// Init commands are deterministic and fast, so this is shorter.
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,
    /// Whether discovery also probes the extended ranges (0180, 01A0).
    #[serde(default)]
    pub extended_probes: bool,
    /// How long the ECU broadcast probe listens for responses, in
    /// milliseconds.
    #[serde(default = "default_ecu_probe_window_ms")]
    pub ecu_probe_window_ms: u64,
}

fn default_command_timeout_ms() -> u64 {
    3000
}

fn default_init_timeout_ms() -> u64 {
    1000
}

fn default_ecu_probe_window_ms() -> u64 {
    1500
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            init_timeout_ms: default_init_timeout_ms(),
            extended_probes: false,
            ecu_probe_window_ms: default_ecu_probe_window_ms(),
        }
    }
}

impl SessionConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn ecu_probe_window(&self) -> Duration {
        Duration::from_millis(self.ecu_probe_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(3));
        assert_eq!(config.init_timeout(), Duration::from_secs(1));
        assert!(!config.extended_probes);
    }

    #[test]
    fn deserialize_empty_toml_uses_defaults() {
        let config: SessionConfig = toml::from_str("").unwrap();
        assert_eq!(config.command_timeout_ms, 3000);
        assert_eq!(config.ecu_probe_window_ms, 1500);
    }

    #[test]
    fn deserialize_full_toml() {
        let toml = r#"
command_timeout_ms = 5000
init_timeout_ms = 500
extended_probes = true
ecu_probe_window_ms = 2500
"#;
        let config: SessionConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(5));
        assert_eq!(config.init_timeout(), Duration::from_millis(500));
        assert!(config.extended_probes);
        assert_eq!(config.ecu_probe_window(), Duration::from_millis(2500));
    }
}
