//! # SensorSupervisor: acquisition with bounded-retry recovery.
//!
//! Produces an infinite, restartable sequence of acquisitions from one
//! [`SensorChannel`]:
//!
//! ```text
//! next()
//!   ├─ Operational ──► acquire()
//!   │      ├─ Ok   ─► Reading                     (stay Operational)
//!   │      └─ Err  ─► Skipped                     (enter Degraded, counter = 0)
//!   │
//!   └─ Degraded(n) ──► reinitialize()
//!          ├─ Ok  ──► acquire()
//!          │     ├─ Ok  ─► Reading                (back to Operational)
//!          │     └─ Err ─► Skipped                (Degraded(n+1))
//!          └─ Err ─► Skipped, sleep(backoff)      (Degraded(n+1))
//! ```
//!
//! ## Rules
//! - Every [`SensorError`] is treated identically; there is no per-kind
//!   branching anywhere in the recovery path.
//! - A failed reinitialize blocks **in-call** for the backoff delay; the
//!   backoff, not the caller's cadence, bounds the retry rate.
//! - Reaching the retry cap publishes [`EventKind::SensorExhausted`] exactly
//!   once per degraded run and then keeps retrying indefinitely — sensors
//!   recover from arbitrarily long outages, so the supervisor never gives up.
//! - A reading emitted after recovery carries no residue of the failure
//!   history; it is converted from the fresh sample like any other.

use tokio::time;

use crate::error::SensorError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::{BackoffPolicy, RetryCounter};
use crate::sensor::channel::SensorChannel;
use crate::sensor::reading::Reading;

/// Recovery state of the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// Reads are succeeding.
    Operational,
    /// Reads are failing; `retries` recovery rounds have failed so far.
    Degraded {
        /// Failed recovery rounds in this degraded run (saturates at the cap).
        retries: u32,
    },
}

/// One result of [`SensorSupervisor::next`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acquisition {
    /// A valid reading.
    Reading(Reading),
    /// No reading this round; the caller skips publishing and waits for the
    /// next cadence tick.
    Skipped,
}

/// Supervises one sensor channel across transient failures.
pub struct SensorSupervisor<C> {
    channel: C,
    retries: RetryCounter,
    backoff: BackoffPolicy,
    degraded: bool,
    exhausted_reported: bool,
    bus: Bus,
}

impl<C: SensorChannel> SensorSupervisor<C> {
    /// Creates a supervisor in the operational state.
    pub fn new(channel: C, max_retries: u32, backoff: BackoffPolicy, bus: Bus) -> Self {
        Self {
            channel,
            retries: RetryCounter::new(max_retries),
            backoff,
            degraded: false,
            exhausted_reported: false,
            bus,
        }
    }

    /// Current recovery state.
    pub fn state(&self) -> SensorState {
        if self.degraded {
            SensorState::Degraded {
                retries: self.retries.count(),
            }
        } else {
            SensorState::Operational
        }
    }

    /// Arms the sensor once at startup.
    ///
    /// A failure here is the caller's problem: the runtime treats it as fatal
    /// because a sensor that never initialized has nothing to supervise.
    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.channel.reinitialize().await
    }

    /// Produces the next acquisition.
    ///
    /// Never fails and never blocks longer than one recovery round (a
    /// reinitialize attempt plus at most one backoff delay).
    pub async fn next(&mut self) -> Acquisition {
        if self.degraded {
            self.recover().await
        } else {
            self.acquire_operational().await
        }
    }

    async fn acquire_operational(&mut self) -> Acquisition {
        match self.channel.acquire().await {
            Ok(reading) => self.emit(reading),
            Err(err) => {
                self.degraded = true;
                self.retries.reset();
                self.exhausted_reported = false;
                self.bus.publish(
                    Event::new(EventKind::SensorDegraded).with_reason(err.to_string()),
                );
                Acquisition::Skipped
            }
        }
    }

    /// One recovery round: reinitialize, then a single read.
    async fn recover(&mut self) -> Acquisition {
        match self.channel.reinitialize().await {
            Ok(()) => match self.channel.acquire().await {
                Ok(reading) => {
                    self.degraded = false;
                    self.retries.reset();
                    self.bus.publish(Event::new(EventKind::SensorRecovered));
                    self.emit(reading)
                }
                Err(err) => {
                    self.record_failed_round(&err, None);
                    Acquisition::Skipped
                }
            },
            Err(err) => {
                let delay = self.backoff.next(self.retries.count());
                self.record_failed_round(&err, Some(delay));
                time::sleep(delay).await;
                Acquisition::Skipped
            }
        }
    }

    fn emit(&self, reading: Reading) -> Acquisition {
        self.bus
            .publish(Event::new(EventKind::ReadingAcquired).with_lux(reading.lux()));
        Acquisition::Reading(reading)
    }

    fn record_failed_round(&mut self, err: &SensorError, delay: Option<time::Duration>) {
        self.retries.record_failure();

        let mut event = Event::new(EventKind::SensorRecoveryFailed)
            .with_attempt(self.retries.count())
            .with_reason(err.to_string());
        if let Some(delay) = delay {
            event = event.with_delay(delay);
        }
        self.bus.publish(event);

        if self.retries.is_exhausted() && !self.exhausted_reported {
            self.exhausted_reported = true;
            self.bus.publish(
                Event::new(EventKind::SensorExhausted).with_attempt(self.retries.count()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::policies::JitterPolicy;

    /// Channel double driven by failure scripts; an exhausted script succeeds.
    #[derive(Default)]
    struct ScriptedChannel {
        acquires: VecDeque<Result<u16, ()>>,
        reinits: VecDeque<Result<(), ()>>,
        reinit_calls: u32,
    }

    impl ScriptedChannel {
        fn bus_error() -> SensorError {
            SensorError::Bus {
                reason: "nack".into(),
            }
        }
    }

    #[async_trait]
    impl SensorChannel for ScriptedChannel {
        async fn acquire(&mut self) -> Result<Reading, SensorError> {
            match self.acquires.pop_front().unwrap_or(Ok(120)) {
                Ok(raw) => Ok(Reading::from_raw(raw, Instant::now().into_std())),
                Err(()) => Err(Self::bus_error()),
            }
        }

        async fn reinitialize(&mut self) -> Result<(), SensorError> {
            self.reinit_calls += 1;
            match self.reinits.pop_front().unwrap_or(Ok(())) {
                Ok(()) => Ok(()),
                Err(()) => Err(Self::bus_error()),
            }
        }
    }

    fn constant_backoff(delay: Duration) -> BackoffPolicy {
        BackoffPolicy {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    fn supervisor_with(
        channel: ScriptedChannel,
        max_retries: u32,
    ) -> (SensorSupervisor<ScriptedChannel>, Bus) {
        let bus = Bus::new(256);
        let supervisor = SensorSupervisor::new(
            channel,
            max_retries,
            constant_backoff(Duration::from_secs(1)),
            bus.clone(),
        );
        (supervisor, bus)
    }

    fn lux_of(acquisition: Acquisition) -> f64 {
        match acquisition {
            Acquisition::Reading(reading) => reading.lux(),
            Acquisition::Skipped => panic!("expected a reading"),
        }
    }

    #[tokio::test]
    async fn test_operational_emits_readings() {
        let mut channel = ScriptedChannel::default();
        channel.acquires.push_back(Ok(12));
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        let lux = lux_of(supervisor.next().await);

        assert!((lux - 10.0).abs() < 1e-3);
        assert_eq!(supervisor.state(), SensorState::Operational);
    }

    #[tokio::test]
    async fn test_first_failure_degrades_and_skips() {
        let mut channel = ScriptedChannel::default();
        channel.acquires.push_back(Err(()));
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        let acquisition = supervisor.next().await;

        assert_eq!(acquisition, Acquisition::Skipped);
        assert_eq!(supervisor.state(), SensorState::Degraded { retries: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_emits_reading_without_stale_state() {
        let mut channel = ScriptedChannel::default();
        // One bad read, then the fresh sample after recovery.
        channel.acquires.push_back(Err(()));
        channel.acquires.push_back(Ok(65_535));
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        assert_eq!(supervisor.next().await, Acquisition::Skipped);
        let lux = lux_of(supervisor.next().await);

        assert!((lux - 54_612.5).abs() < 1e-3);
        assert_eq!(supervisor.state(), SensorState::Operational);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reinitialize_blocks_for_backoff() {
        let mut channel = ScriptedChannel::default();
        channel.acquires.push_back(Err(()));
        channel.reinits.push_back(Err(()));
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        supervisor.next().await; // degrade

        let before = Instant::now();
        supervisor.next().await; // failed recovery round
        assert_eq!(Instant::now() - before, Duration::from_secs(1));
        assert_eq!(supervisor.state(), SensorState::Degraded { retries: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_read_after_reinitialize_does_not_back_off() {
        let mut channel = ScriptedChannel::default();
        channel.acquires.push_back(Err(())); // degrade
        channel.acquires.push_back(Err(())); // read fails after a good reinit
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        supervisor.next().await;

        let before = Instant::now();
        supervisor.next().await;
        assert_eq!(Instant::now(), before);
        assert_eq!(supervisor.state(), SensorState::Degraded { retries: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_is_reported_once_and_retries_continue() {
        let mut channel = ScriptedChannel::default();
        channel.acquires.push_back(Err(()));
        for _ in 0..20 {
            channel.reinits.push_back(Err(()));
        }
        let (mut supervisor, bus) = supervisor_with(channel, 3);
        let mut events = bus.subscribe();

        supervisor.next().await; // degrade
        for _ in 0..6 {
            // Twice the cap; rounds keep running past it.
            assert_eq!(supervisor.next().await, Acquisition::Skipped);
        }

        assert_eq!(supervisor.state(), SensorState::Degraded { retries: 3 });
        // All 6 rounds issued a reinitialize attempt.
        assert_eq!(supervisor.channel.reinit_calls, 6);

        let mut exhausted = Vec::new();
        let mut failed_rounds = 0;
        while let Ok(ev) = events.try_recv() {
            match ev.kind {
                EventKind::SensorExhausted => exhausted.push(ev.attempt),
                EventKind::SensorRecoveryFailed => failed_rounds += 1,
                _ => {}
            }
        }
        assert_eq!(exhausted, vec![Some(3)]);
        assert_eq!(failed_rounds, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_flag_resets_after_recovery() {
        let mut channel = ScriptedChannel::default();
        // First degraded run: one read failure, one failed round, cap 1.
        channel.acquires.push_back(Err(()));
        channel.reinits.push_back(Err(()));
        // Recovery, then a second degraded run that exhausts again.
        channel.acquires.push_back(Ok(120));
        channel.acquires.push_back(Err(()));
        channel.reinits.push_back(Ok(()));
        channel.reinits.push_back(Err(()));
        let (mut supervisor, bus) = supervisor_with(channel, 1);
        let mut events = bus.subscribe();

        supervisor.next().await; // degrade
        supervisor.next().await; // exhaust run #1
        supervisor.next().await; // recover with a reading
        supervisor.next().await; // degrade again
        supervisor.next().await; // exhaust run #2

        let exhausted = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::SensorExhausted)
            .count();
        assert_eq!(exhausted, 2);
    }

    #[tokio::test]
    async fn test_init_arms_the_channel() {
        let (mut supervisor, _bus) = supervisor_with(ScriptedChannel::default(), 10);

        supervisor.init().await.unwrap();

        assert_eq!(supervisor.channel.reinit_calls, 1);
    }

    #[tokio::test]
    async fn test_init_surfaces_failure() {
        let mut channel = ScriptedChannel::default();
        channel.reinits.push_back(Err(()));
        let (mut supervisor, _bus) = supervisor_with(channel, 10);

        assert!(supervisor.init().await.is_err());
    }
}
