//! # Runtime events emitted by the supervisors and the main loop.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Link events**: the network-association lifecycle (connecting, retrying,
//!   connected, failed)
//! - **Sensor events**: acquisition flow and the degraded recovery path
//! - **Telemetry/runtime events**: publish outcomes and shutdown
//!
//! The [`Event`] struct carries additional metadata such as attempt counts,
//! backoff delays, reading values, and remote status codes.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use luxvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::SensorRecoveryFailed)
//!     .with_attempt(3)
//!     .with_reason("bus transaction failed: nack");
//!
//! assert_eq!(ev.kind, EventKind::SensorRecoveryFailed);
//! assert_eq!(ev.attempt, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("bus transaction failed: nack"));
//! ```

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Link lifecycle ===
    /// The initial association attempt was issued after the radio started.
    LinkConnecting,

    /// A disconnect notification arrived below the retry cap; a new
    /// association attempt was issued.
    ///
    /// Sets: `attempt` (1-based retry count).
    LinkRetrying,

    /// The station acquired an address; the link is up.
    ///
    /// Sets: `addr`.
    LinkConnected,

    /// The retry cap was reached; the link is down for the rest of this boot.
    ///
    /// Sets: `attempt` (final retry count), optionally `reason`.
    LinkFailed,

    // === Sensor lifecycle ===
    /// A read failed while operational; the supervisor entered its recovery
    /// loop.
    ///
    /// Sets: `reason`.
    SensorDegraded,

    /// One recovery round (reinitialize, then read) failed.
    ///
    /// Sets: `attempt`, `reason`; `delay_ms` when the round ended in a backoff
    /// sleep.
    SensorRecoveryFailed,

    /// A recovery round succeeded; the supervisor is operational again.
    SensorRecovered,

    /// The recovery retry cap was reached. Emitted once per degraded run;
    /// recovery attempts continue indefinitely afterwards.
    ///
    /// Sets: `attempt`.
    SensorExhausted,

    /// A reading was acquired.
    ///
    /// Sets: `lux`.
    ReadingAcquired,

    // === Telemetry ===
    /// A reading was delivered to the collector. The remote status code is
    /// recorded but never used for control flow.
    ///
    /// Sets: `status`, `lux`.
    PublishSucceeded,

    /// A delivery attempt failed or timed out; the reading was discarded.
    ///
    /// Sets: `reason`.
    PublishFailed,

    // === Runtime ===
    /// Shutdown requested (OS signal observed).
    ShutdownRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next recovery round in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Reading value in lux.
    pub lux: Option<f64>,
    /// Remote HTTP status code (observability only).
    pub status: Option<u16>,
    /// Station address after association.
    pub addr: Option<Ipv4Addr>,
    /// Human-readable reason (errors, ignored notifications, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            attempt: None,
            delay_ms: None,
            lux: None,
            status: None,
            addr: None,
            reason: None,
        }
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a reading value.
    #[inline]
    pub fn with_lux(mut self, lux: f64) -> Self {
        self.lux = Some(lux);
        self
    }

    /// Attaches a remote status code.
    #[inline]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the acquired station address.
    #[inline]
    pub fn with_addr(mut self, addr: Ipv4Addr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
