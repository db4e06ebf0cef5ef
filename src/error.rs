//! Error types used by the luxvisor runtime and its collaborators.
//!
//! This module defines the failure taxonomy of the system:
//!
//! - [`SensorError`] — transient sensor-channel failures; the sensor supervisor
//!   retries these with backoff and never treats them as fatal after startup.
//! - [`TransportError`] — telemetry delivery failures; always logged and
//!   discarded by the runtime (best-effort delivery).
//! - [`RuntimeError`] — failures of the runtime itself; sensor initialization
//!   at boot is the only fatal path.
//! - [`ConfigError`] — configuration loading and validation failures.
//!
//! All types provide `as_label()` for stable snake_case identifiers in
//! logs/metrics. Link failure is intentionally absent here: a failed
//! association is a first-class [`LinkOutcome`](crate::LinkOutcome), not an
//! error.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the sensor channel.
///
/// The sensor supervisor treats every variant identically: each one sends the
/// acquisition path into its degraded recovery loop. The variants exist for
/// diagnostics only, never for branching.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SensorError {
    /// A bus transaction (command write or sample read) failed.
    #[error("bus transaction failed: {reason}")]
    Bus {
        /// Description from the bus driver.
        reason: String,
    },

    /// A bus transaction exceeded its per-transaction timeout.
    #[error("bus transaction timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl SensorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use luxvisor::SensorError;
    ///
    /// let err = SensorError::Bus { reason: "nack".into() };
    /// assert_eq!(err.as_label(), "sensor_bus");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SensorError::Bus { .. } => "sensor_bus",
            SensorError::Timeout { .. } => "sensor_timeout",
        }
    }
}

/// # Errors produced by telemetry delivery.
///
/// These never propagate past a single loop iteration: the runtime logs the
/// failure and moves on to the next cadence tick.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be completed at the transport level.
    #[error("transport failed: {reason}")]
    Transport {
        /// Description from the HTTP client.
        reason: String,
    },

    /// The request exceeded the configured publish timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Transport { .. } => "transport_failed",
            TransportError::Timeout { .. } => "transport_timeout",
        }
    }
}

/// # Errors produced by the runtime.
///
/// Sensor initialization failure at startup is the single fatal condition in
/// the system: a station whose sensor never armed once has nothing to
/// supervise. Mid-loop sensor failures go through the degraded recovery path
/// instead and never surface here.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The sensor channel failed to initialize before the acquisition loop
    /// started.
    #[error("sensor failed to initialize at startup: {source}")]
    SensorInit {
        /// The underlying channel error.
        #[source]
        source: SensorError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use luxvisor::{RuntimeError, SensorError};
    ///
    /// let err = RuntimeError::SensorInit {
    ///     source: SensorError::Bus { reason: "nack".into() },
    /// };
    /// assert_eq!(err.as_label(), "runtime_sensor_init");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SensorInit { .. } => "runtime_sensor_init",
        }
    }
}

/// # Errors produced while loading or validating configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {reason}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Description from the filesystem.
        reason: String,
    },

    /// The configuration text could not be parsed.
    #[error("failed to parse config: {reason}")]
    Parse {
        /// Description from the parser.
        reason: String,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Which field and why.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "config_io",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}
