//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `relayhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Controlled device settings.
    pub device: DeviceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// The device whose relays this daemon reconciles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Store key of the device record.
    pub id: String,
    /// Relays seeded into the store when the device record is absent.
    pub relays: Vec<RelaySeed>,
}

/// One relay to seed, off and without a timer.
#[derive(Debug, Deserialize)]
pub struct RelaySeed {
    /// Store key of the relay within the device record.
    pub id: String,
    /// Human-readable label.
    pub name: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `relayhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("relayhub.toml")?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RELAYHUB_DEVICE_ID") {
            self.device.id = val;
        }
        if let Ok(val) = std::env::var("RELAYHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "device id must not be empty".to_string(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for relay in &self.device.relays {
            if relay.id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "relay id must not be empty".to_string(),
                ));
            }
            if !seen.insert(relay.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate relay id: {}",
                    relay.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: "pico_w_001".to_string(),
            relays: (1..=4)
                .map(|index| RelaySeed {
                    id: format!("relay_{index}"),
                    name: format!("Relay {index}"),
                })
                .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "relayhubd=info,relayhub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
