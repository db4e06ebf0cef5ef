//! # LinkSupervisor: network-association state machine.
//!
//! Supervises one association lifecycle with a bounded retry budget:
//!
//! ```text
//! connect()
//!   ├─► radio.start(credentials)
//!   └─► loop over RadioEvent notifications:
//!         ├─ StartRequested    ─► radio.associate()          (initial attempt)
//!         ├─ Disconnected      ─► retries left?
//!         │      ├─ yes        ─► counter += 1, radio.associate()
//!         │      └─ no         ─► state = Failed  ─► return LinkOutcome::Failed
//!         └─ AddressAcquired   ─► counter = 0, state = Connected
//!                              ─► return LinkOutcome::Connected(addr)
//! ```
//!
//! ## Rules
//! - Exactly **one** outcome per `connect()` call; the notification stream is
//!   consumed until Connected or Failed fires, never both.
//! - The retry counter and link state are owned here and mutated nowhere else.
//! - `Failed` is a first-class outcome, not an error: the caller decides
//!   whether to proceed without the network (the runtime does).
//! - A closed notification channel means the radio stack is gone; that is
//!   reported as `Failed` rather than a panic or a hang.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::link::radio::{Radio, RadioEvent, StationCredentials};
use crate::policies::RetryCounter;

/// Association lifecycle state. Mutated only by [`LinkSupervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Created, no association requested yet.
    Idle,
    /// `connect()` is driving association attempts.
    Connecting,
    /// The station holds an address.
    Connected,
    /// The retry budget is exhausted for this boot.
    Failed,
}

/// Terminal result of one `connect()` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Association and address acquisition succeeded.
    Connected(Ipv4Addr),
    /// The retry budget was exhausted (or the radio stack went away).
    Failed,
}

/// Drives the radio through association with bounded retries.
pub struct LinkSupervisor {
    radio: Arc<dyn Radio>,
    notifications: mpsc::Receiver<RadioEvent>,
    credentials: StationCredentials,
    retries: RetryCounter,
    state: LinkState,
    bus: Bus,
}

impl LinkSupervisor {
    /// Creates a supervisor in [`LinkState::Idle`].
    ///
    /// `notifications` must be the receiving half of the channel the radio
    /// implementation sends its [`RadioEvent`]s on.
    pub fn new(
        radio: Arc<dyn Radio>,
        notifications: mpsc::Receiver<RadioEvent>,
        credentials: StationCredentials,
        max_retries: u32,
        bus: Bus,
    ) -> Self {
        Self {
            radio,
            notifications,
            credentials,
            retries: RetryCounter::new(max_retries),
            state: LinkState::Idle,
            bus,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Retries consumed so far in this lifecycle.
    pub fn retry_count(&self) -> u32 {
        self.retries.count()
    }

    /// Returns the supervisor to [`LinkState::Idle`] with a full retry budget.
    ///
    /// This is the explicit reconnect hook; the runtime never calls it (a
    /// failed link stays failed for the rest of the boot).
    pub fn reset(&mut self) {
        self.retries.reset();
        self.state = LinkState::Idle;
    }

    /// Blocks until the association either comes up or exhausts its retries.
    ///
    /// Starts the radio, then waits on the notification stream. Every
    /// disconnect below the cap consumes one retry and issues exactly one new
    /// association attempt; an address acquisition resets the counter and
    /// resolves to [`LinkOutcome::Connected`].
    pub async fn connect(&mut self) -> LinkOutcome {
        self.state = LinkState::Connecting;
        self.radio.start(&self.credentials).await;

        loop {
            let Some(notification) = self.notifications.recv().await else {
                return self.fail("radio notification channel closed");
            };

            match notification {
                RadioEvent::StartRequested => {
                    self.bus.publish(Event::new(EventKind::LinkConnecting));
                    self.radio.associate().await;
                }
                RadioEvent::Disconnected => {
                    if self.retries.try_retry() {
                        self.bus.publish(
                            Event::new(EventKind::LinkRetrying)
                                .with_attempt(self.retries.count()),
                        );
                        self.radio.associate().await;
                    } else {
                        return self.fail("retry budget exhausted");
                    }
                }
                RadioEvent::AddressAcquired(addr) => {
                    self.retries.reset();
                    self.state = LinkState::Connected;
                    self.bus
                        .publish(Event::new(EventKind::LinkConnected).with_addr(addr));
                    return LinkOutcome::Connected(addr);
                }
            }
        }
    }

    fn fail(&mut self, reason: &str) -> LinkOutcome {
        self.state = LinkState::Failed;
        self.bus.publish(
            Event::new(EventKind::LinkFailed)
                .with_attempt(self.retries.count())
                .with_reason(reason.to_string()),
        );
        LinkOutcome::Failed
    }
}
