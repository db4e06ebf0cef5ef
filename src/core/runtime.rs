//! # Runtime: the station's main loop.
//!
//! Composes the link supervisor (run once at startup), the sensor supervisor
//! (driven forever at a fixed cadence), and the telemetry publisher
//! (best-effort per reading).
//!
//! ## High-level flow
//! ```text
//! run()
//!   ├─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   ├─► LinkSupervisor::connect()          (blocks: Connected or Failed)
//!   │       └─ Failed ─► keep going — the loop has value offline
//!   ├─► SensorSupervisor::init()
//!   │       └─ Err ─► RuntimeError::SensorInit   (the only fatal exit)
//!   └─► loop every cadence tick:
//!         ├─► SensorSupervisor::next()
//!         │       ├─ Reading ─► publish under timeout
//!         │       │               ├─ Ok(delivery) ─► PublishSucceeded (status logged)
//!         │       │               └─ Err/timeout  ─► PublishFailed    (discarded)
//!         │       └─ Skipped ─► nothing to publish
//!         └─► (outcome never affects the next tick's schedule)
//!
//! Shutdown path:
//!   OS signal ──► Bus.publish(ShutdownRequested) ──► token.cancel()
//!             ──► loop observes the token between iterations and returns
//! ```
//!
//! ## Rules
//! - Acquisition strictly precedes publish within one iteration.
//! - A publish failure or timeout never escapes its iteration.
//! - Overrun ticks are skipped, not bursted; the cadence never compresses.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::shutdown;
use crate::error::{RuntimeError, TransportError};
use crate::events::{Bus, Event, EventKind};
use crate::link::{LinkSupervisor, Radio, RadioEvent, StationCredentials};
use crate::sensor::{Acquisition, Reading, SensorChannel, SensorSupervisor};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::telemetry::Publish;

/// Owns the event bus, the subscriber set, and the composition of the two
/// supervisors with the publisher.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl Runtime {
    /// Creates a runtime with the given config and subscribers.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.runtime.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self { cfg, bus, subs }
    }

    /// The runtime's event bus (for additional listeners).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs the station until an OS termination signal arrives.
    ///
    /// `notifications` must be the receiving half of the channel `radio`
    /// sends its [`RadioEvent`]s on.
    pub async fn run<C, P>(
        &self,
        radio: Arc<dyn Radio>,
        notifications: mpsc::Receiver<RadioEvent>,
        channel: C,
        publisher: P,
    ) -> Result<(), RuntimeError>
    where
        C: SensorChannel,
        P: Publish,
    {
        let token = CancellationToken::new();
        let supervise = self.run_with_shutdown(token.clone(), radio, notifications, channel, publisher);
        tokio::pin!(supervise);

        tokio::select! {
            _ = shutdown::wait_for_shutdown_signal() => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                token.cancel();
                (&mut supervise).await
            }
            res = &mut supervise => res,
        }
    }

    /// Runs the station until `token` is cancelled.
    ///
    /// Exposed for embedders that manage their own shutdown; [`Runtime::run`]
    /// wires it to OS signals. Cancellation is observed between loop
    /// iterations, never in the middle of an acquisition or publish.
    pub async fn run_with_shutdown<C, P>(
        &self,
        token: CancellationToken,
        radio: Arc<dyn Radio>,
        notifications: mpsc::Receiver<RadioEvent>,
        channel: C,
        publisher: P,
    ) -> Result<(), RuntimeError>
    where
        C: SensorChannel,
        P: Publish,
    {
        self.subscriber_listener();

        let credentials = StationCredentials {
            ssid: self.cfg.network.ssid.clone(),
            passphrase: self.cfg.network.passphrase.clone(),
        };
        let mut link = LinkSupervisor::new(
            radio,
            notifications,
            credentials,
            self.cfg.network.max_retries,
            self.bus.clone(),
        );

        // One association lifecycle per boot. A failed link is logged by the
        // supervisor and the station keeps acquiring offline.
        tokio::select! {
            _ = token.cancelled() => return Ok(()),
            _outcome = link.connect() => {}
        }

        let mut sensor = SensorSupervisor::new(
            channel,
            self.cfg.sensor.max_recovery_retries,
            self.cfg.recovery_backoff(),
            self.bus.clone(),
        );
        sensor
            .init()
            .await
            .map_err(|source| RuntimeError::SensorInit { source })?;

        let mut cadence = time::interval(self.cfg.cadence());
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                _ = cadence.tick() => {}
            }

            if let Acquisition::Reading(reading) = sensor.next().await {
                self.publish(&publisher, &reading).await;
            }
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// One best-effort delivery under the configured timeout.
    async fn publish<P: Publish>(&self, publisher: &P, reading: &Reading) {
        let timeout = self.cfg.publish_timeout();
        match time::timeout(timeout, publisher.publish(reading)).await {
            Ok(Ok(delivery)) => {
                self.bus.publish(
                    Event::new(EventKind::PublishSucceeded)
                        .with_status(delivery.status)
                        .with_lux(reading.lux()),
                );
            }
            Ok(Err(err)) => {
                self.bus
                    .publish(Event::new(EventKind::PublishFailed).with_reason(err.to_string()));
            }
            Err(_elapsed) => {
                let err = TransportError::Timeout { timeout };
                self.bus
                    .publish(Event::new(EventKind::PublishFailed).with_reason(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::broadcast;
    use tokio::time::Instant;

    use crate::error::SensorError;
    use crate::telemetry::Delivery;

    /// Radio double: disconnects `failures` times, then hands out an address.
    struct ScriptedRadio {
        notifications: mpsc::Sender<RadioEvent>,
        failures: u32,
        attempts: AtomicU32,
    }

    impl ScriptedRadio {
        fn pair(failures: u32) -> (Arc<Self>, mpsc::Receiver<RadioEvent>) {
            let (tx, rx) = mpsc::channel(8);
            (
                Arc::new(Self {
                    notifications: tx,
                    failures,
                    attempts: AtomicU32::new(0),
                }),
                rx,
            )
        }
    }

    #[async_trait]
    impl Radio for ScriptedRadio {
        async fn start(&self, _credentials: &StationCredentials) {
            self.notifications
                .send(RadioEvent::StartRequested)
                .await
                .unwrap();
        }

        async fn associate(&self) {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let outcome = if attempt <= self.failures {
                RadioEvent::Disconnected
            } else {
                RadioEvent::AddressAcquired(Ipv4Addr::new(10, 0, 0, 7))
            };
            self.notifications.send(outcome).await.unwrap();
        }
    }

    /// Channel double: a fixed raw value per read, with an optional broken
    /// arming sequence.
    struct SteadyChannel {
        raw: u16,
        init_fails: bool,
    }

    #[async_trait]
    impl SensorChannel for SteadyChannel {
        async fn acquire(&mut self) -> Result<Reading, SensorError> {
            Ok(Reading::from_raw(self.raw, Instant::now().into_std()))
        }

        async fn reinitialize(&mut self) -> Result<(), SensorError> {
            if self.init_fails {
                Err(SensorError::Bus {
                    reason: "sensor absent".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    /// Publisher double that records delivered values and can be set to fail.
    struct ScriptedPublisher {
        delivered: Mutex<Vec<f64>>,
        fail: bool,
    }

    impl ScriptedPublisher {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Publish for ScriptedPublisher {
        async fn publish(&self, reading: &Reading) -> Result<Delivery, TransportError> {
            if self.fail {
                return Err(TransportError::Transport {
                    reason: "connection refused".into(),
                });
            }
            self.delivered.lock().unwrap().push(reading.lux());
            Ok(Delivery { status: 200 })
        }
    }

    #[async_trait]
    impl Publish for Arc<ScriptedPublisher> {
        async fn publish(&self, reading: &Reading) -> Result<Delivery, TransportError> {
            self.as_ref().publish(reading).await
        }
    }

    fn runtime() -> Arc<Runtime> {
        Arc::new(Runtime::new(Config::default(), Vec::new()))
    }

    /// Receives events until `want` of kind `kind` were seen or the stream
    /// lags out.
    async fn wait_for(
        events: &mut broadcast::Receiver<Event>,
        kind: EventKind,
        want: usize,
    ) -> Vec<Event> {
        let mut seen = Vec::new();
        while seen.len() < want {
            match events.recv().await {
                Ok(ev) => {
                    if ev.kind == kind {
                        seen.push(ev);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failure_keeps_the_cadence() {
        let rt = runtime();
        let mut events = rt.bus().subscribe();
        let (radio, notifications) = ScriptedRadio::pair(0);
        let publisher = ScriptedPublisher::failing();
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let rt = rt.clone();
            let token = token.clone();
            let publisher = publisher.clone();
            async move {
                rt.run_with_shutdown(
                    token,
                    radio,
                    notifications,
                    SteadyChannel {
                        raw: 120,
                        init_fails: false,
                    },
                    publisher,
                )
                .await
            }
        });

        // Three full iterations despite every publish failing.
        let failures = wait_for(&mut events, EventKind::PublishFailed, 3).await;
        assert_eq!(failures.len(), 3);

        token.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_readings_flow_to_the_publisher() {
        let rt = runtime();
        let mut events = rt.bus().subscribe();
        let (radio, notifications) = ScriptedRadio::pair(0);
        let publisher = ScriptedPublisher::ok();
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let rt = rt.clone();
            let token = token.clone();
            let publisher = publisher.clone();
            async move {
                rt.run_with_shutdown(
                    token,
                    radio,
                    notifications,
                    SteadyChannel {
                        raw: 12,
                        init_fails: false,
                    },
                    publisher,
                )
                .await
            }
        });

        let succeeded = wait_for(&mut events, EventKind::PublishSucceeded, 2).await;
        token.cancel();
        handle.await.unwrap().unwrap();

        // Status is recorded on the event, and the delivered values carry the
        // exact conversion of the raw sample.
        assert!(succeeded.iter().all(|ev| ev.status == Some(200)));
        let delivered = publisher.delivered.lock().unwrap();
        assert!(delivered.len() >= 2);
        assert!(delivered.iter().all(|lux| (lux - 10.0).abs() < 1e-3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_station_stays_alive_without_network() {
        let rt = runtime();
        let mut events = rt.bus().subscribe();
        // Every association attempt disconnects; the default budget is 10.
        let (radio, notifications) = ScriptedRadio::pair(u32::MAX);
        let publisher = ScriptedPublisher::ok();
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let rt = rt.clone();
            let token = token.clone();
            let publisher = publisher.clone();
            async move {
                rt.run_with_shutdown(
                    token,
                    radio.clone(),
                    notifications,
                    SteadyChannel {
                        raw: 600,
                        init_fails: false,
                    },
                    publisher,
                )
                .await?;
                Ok::<u32, RuntimeError>(radio.attempts.load(Ordering::SeqCst))
            }
        });

        let failed = wait_for(&mut events, EventKind::LinkFailed, 1).await;
        assert_eq!(failed[0].attempt, Some(10));

        // The acquisition loop still runs after the link gave up.
        let readings = wait_for(&mut events, EventKind::ReadingAcquired, 2).await;
        assert_eq!(readings.len(), 2);

        token.cancel();
        let attempts = handle.await.unwrap().unwrap();
        // Initial attempt plus the full retry budget, then nothing more.
        assert_eq!(attempts, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensor_init_failure_is_fatal() {
        let rt = runtime();
        let (radio, notifications) = ScriptedRadio::pair(0);
        let publisher = ScriptedPublisher::ok();

        let err = rt
            .run_with_shutdown(
                CancellationToken::new(),
                radio,
                notifications,
                SteadyChannel {
                    raw: 0,
                    init_fails: true,
                },
                publisher,
            )
            .await
            .unwrap_err();

        assert_eq!(err.as_label(), "runtime_sensor_init");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_link_phase_exits_cleanly() {
        struct StallingRadio;

        #[async_trait]
        impl Radio for StallingRadio {
            async fn start(&self, _credentials: &StationCredentials) {}
            async fn associate(&self) {}
        }

        let rt = runtime();
        // Keep the sender half alive so connect() waits forever.
        let (_tx, notifications) = mpsc::channel(8);
        let publisher = ScriptedPublisher::ok();
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let rt = rt.clone();
            let token = token.clone();
            let publisher = publisher.clone();
            async move {
                rt.run_with_shutdown(
                    token,
                    Arc::new(StallingRadio),
                    notifications,
                    SteadyChannel {
                        raw: 0,
                        init_fails: false,
                    },
                    publisher,
                )
                .await
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
