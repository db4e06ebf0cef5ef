//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [link] association attempt issued
//! [link] retrying attempt=3
//! [link] connected addr=192.168.1.42
//! [link] association failed after 10 retries: retry budget exhausted
//! [sensor] degraded: bus transaction failed: nack
//! [sensor] recovery failed attempt=2 delay=1000ms: bus transaction failed: nack
//! [sensor] recovered
//! [sensor] recovery attempts exhausted after 10 rounds
//! [sensor] lux=123.45
//! [telemetry] delivered lux=123.45 status=200
//! [telemetry] publish failed: request timed out after 10s
//! [runtime] shutdown requested
//! ```
//!
//! Not intended for production use - implement a custom [`Subscribe`] for
//! structured logging or metrics collection.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::LinkConnecting => {
                println!("[link] association attempt issued");
            }
            EventKind::LinkRetrying => {
                if let Some(attempt) = e.attempt {
                    println!("[link] retrying attempt={attempt}");
                }
            }
            EventKind::LinkConnected => {
                if let Some(addr) = e.addr {
                    println!("[link] connected addr={addr}");
                }
            }
            EventKind::LinkFailed => {
                println!(
                    "[link] association failed after {} retries: {}",
                    e.attempt.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::SensorDegraded => {
                println!(
                    "[sensor] degraded: {}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::SensorRecoveryFailed => {
                let delay = e
                    .delay_ms
                    .map(|ms| format!(" delay={ms}ms"))
                    .unwrap_or_default();
                println!(
                    "[sensor] recovery failed attempt={}{delay}: {}",
                    e.attempt.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::SensorRecovered => {
                println!("[sensor] recovered");
            }
            EventKind::SensorExhausted => {
                println!(
                    "[sensor] recovery attempts exhausted after {} rounds",
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::ReadingAcquired => {
                if let Some(lux) = e.lux {
                    println!("[sensor] lux={lux:.2}");
                }
            }
            EventKind::PublishSucceeded => {
                println!(
                    "[telemetry] delivered lux={:.2} status={}",
                    e.lux.unwrap_or(0.0),
                    e.status.unwrap_or(0),
                );
            }
            EventKind::PublishFailed => {
                println!(
                    "[telemetry] publish failed: {}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::ShutdownRequested => {
                println!("[runtime] shutdown requested");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
