//! # Externalized station configuration.
//!
//! Everything the reference firmware hard-codes — SSID, credential, retry
//! caps, bus cadence, collector endpoint, timeouts — lives in a TOML file
//! here:
//!
//! ```toml
//! [device]
//! id = "bh1750"
//!
//! [network]
//! ssid = "lab-ap"
//! passphrase = "hunter2"
//! max_retries = 10
//!
//! [sensor]
//! cadence_ms = 2000
//! max_recovery_retries = 10
//! recovery_backoff_ms = 1000
//!
//! [telemetry]
//! endpoint = "http://192.168.1.5:3000/api/data"
//! timeout_ms = 10000
//! ```
//!
//! Defaults match the reference constants; only the SSID and the collector
//! endpoint have no usable default and are rejected by [`Config::validate`]
//! when empty. Durations are written as integer milliseconds and exposed as
//! [`Duration`]s through accessors.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, JitterPolicy};

/// Station identity.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Identifier sent with every telemetry record.
    pub id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { id: "bh1750".into() }
    }
}

/// Wireless network settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Access point SSID. Required.
    pub ssid: String,
    /// WPA2-PSK pre-shared key.
    pub passphrase: String,
    /// Re-association attempts before the link is declared failed for this
    /// boot.
    pub max_retries: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            passphrase: String::new(),
            max_retries: 10,
        }
    }
}

/// Sensor acquisition and recovery settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    /// Period between acquisition attempts, in milliseconds.
    pub cadence_ms: u64,
    /// Failed recovery rounds before the exhaustion observation fires.
    pub max_recovery_retries: u32,
    /// Initial delay after a failed reinitialize, in milliseconds.
    pub recovery_backoff_ms: u64,
    /// Growth factor for the recovery delay (`1.0` = constant).
    pub recovery_backoff_factor: f64,
    /// Cap for the recovery delay, in milliseconds.
    pub recovery_backoff_max_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            cadence_ms: 2000,
            max_recovery_retries: 10,
            recovery_backoff_ms: 1000,
            recovery_backoff_factor: 1.0,
            recovery_backoff_max_ms: 1000,
        }
    }
}

/// Collector settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Collector URL. Required.
    pub endpoint: String,
    /// Per-request publish timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: 10_000,
        }
    }
}

/// Runtime plumbing settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Capacity of the event bus ring buffer (min 1; clamped by `Bus`).
    pub bus_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}

/// Full station configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Station identity.
    pub device: DeviceConfig,
    /// Wireless network settings.
    pub network: NetworkConfig,
    /// Sensor acquisition and recovery settings.
    pub sensor: SensorConfig,
    /// Collector settings.
    pub telemetry: TelemetryConfig,
    /// Runtime plumbing settings.
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the runtime cannot operate on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.ssid.is_empty() {
            return Err(invalid("network.ssid must not be empty"));
        }
        if self.telemetry.endpoint.is_empty() {
            return Err(invalid("telemetry.endpoint must not be empty"));
        }
        if self.sensor.cadence_ms == 0 {
            return Err(invalid("sensor.cadence_ms must be positive"));
        }
        if self.telemetry.timeout_ms == 0 {
            return Err(invalid("telemetry.timeout_ms must be positive"));
        }
        if self.sensor.recovery_backoff_ms == 0 {
            return Err(invalid("sensor.recovery_backoff_ms must be positive"));
        }
        let factor = self.sensor.recovery_backoff_factor;
        if !factor.is_finite() || factor < 1.0 {
            return Err(invalid(
                "sensor.recovery_backoff_factor must be a finite value >= 1.0",
            ));
        }
        if self.sensor.recovery_backoff_max_ms < self.sensor.recovery_backoff_ms {
            return Err(invalid(
                "sensor.recovery_backoff_max_ms must be >= sensor.recovery_backoff_ms",
            ));
        }
        Ok(())
    }

    /// Period between acquisition attempts.
    #[inline]
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.sensor.cadence_ms)
    }

    /// Per-request publish timeout.
    #[inline]
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry.timeout_ms)
    }

    /// Backoff policy for failed sensor-recovery rounds.
    pub fn recovery_backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(self.sensor.recovery_backoff_ms),
            max: Duration::from_millis(self.sensor.recovery_backoff_max_ms),
            factor: self.sensor.recovery_backoff_factor,
            jitter: JitterPolicy::None,
        }
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_string(),
    }
}
