//! # Telemetry publisher boundary.
//!
//! [`Publish`] is the narrow interface the runtime hands readings to. The
//! contract is strictly best-effort: the runtime invokes it under a fixed
//! timeout, logs the outcome, and moves on — no retry queue, no buffering, no
//! backpressure. Telemetry loss is acceptable; acquisition-loop liveness is
//! not.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::sensor::Reading;

/// Receipt for a completed delivery.
///
/// Carries the remote status code for observability. The runtime records it
/// and never branches on it: any transport-level completion counts as
/// success, 4xx/5xx included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status code reported by the collector.
    pub status: u16,
}

/// Delivers one reading to the remote collector.
#[async_trait]
pub trait Publish: Send + Sync + 'static {
    /// Publishes a single reading.
    ///
    /// Implementations bound their own transport latency; the runtime
    /// additionally wraps each call in the configured publish timeout.
    async fn publish(&self, reading: &Reading) -> Result<Delivery, TransportError>;
}
