//! # luxvisor
//!
//! **Luxvisor** is a connectivity-and-telemetry supervisor for a constrained
//! light-sensing station: it brings up a wireless link with a bounded retry
//! budget, supervises a single BH1750 ambient-light sensor across transient
//! failures, and republishes readings to a remote collector best-effort.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!               ┌─────────────────┐        ┌──────────────────┐
//!               │  Radio (driver) │        │ LightBus (driver)│
//!               └───────┬─────────┘        └────────┬─────────┘
//!          RadioEvent   │ mpsc                      │
//!                       ▼                           ▼
//!            ┌──────────────────┐        ┌───────────────────┐
//!            │  LinkSupervisor  │        │  Bh1750Channel    │
//!            │ (bounded retry)  │        └────────┬──────────┘
//!            └────────┬─────────┘                 ▼
//!                     │ once per boot   ┌───────────────────┐
//!                     ▼                 │  SensorSupervisor │
//!            ┌─────────────────────────►│ (recovery loop)   │
//!            │        Runtime          └────────┬──────────┘
//!            │  (cadence loop, fan-out)         │ Reading
//!            │                                  ▼
//!            │                         ┌───────────────────┐
//!            │                         │  Publish (HTTP)   │ best-effort
//!            │                         └───────────────────┘
//!            │ publish(Event)
//!            ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Bus (broadcast channel)                  │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               ▼
//!                   ┌────────────────────────┐
//!                   │  subscriber_listener   │
//!                   │      (in Runtime)      │
//!                   └───┬────────────────┬───┘
//!                       ▼                ▼
//!                  [queue S1]  ...  [queue SN]
//!                       ▼                ▼
//!                  sub1.on_event()  subN.on_event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Runtime::run()
//!   ├─► LinkSupervisor::connect()       one association lifecycle per boot
//!   │     ├─ Connected(addr) ─► proceed online
//!   │     └─ Failed          ─► proceed offline (readings still logged)
//!   ├─► SensorSupervisor::init()        fatal if the sensor never arms
//!   └─► every cadence tick:
//!         ├─► SensorSupervisor::next() ─► Reading | Skipped
//!         └─► Reading ─► Publish::publish() under timeout
//!                          (failures logged, never retried, never fatal)
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Link**          | Bounded-retry association with terminal-failure signalling.       | [`LinkSupervisor`], [`LinkOutcome`]         |
//! | **Sensor**        | Read/retry/reinitialize recovery that never gives up permanently. | [`SensorSupervisor`], [`Acquisition`]       |
//! | **Telemetry**     | Best-effort JSON-over-HTTP delivery.                              | [`Publish`], [`HttpPublisher`]              |
//! | **Policies**      | Retry caps and recovery backoff with optional jitter.             | [`RetryCounter`], [`BackoffPolicy`]         |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).            | [`Subscribe`]                               |
//! | **Configuration** | TOML config for everything the firmware used to hard-code.        | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio::sync::mpsc;
//! use luxvisor::{
//!     Bh1750Channel, Config, HttpPublisher, LightBus, Radio, RadioEvent, Runtime,
//!     SensorError, StationCredentials,
//! };
//!
//! // Platform glue: forward driver callbacks as RadioEvents.
//! struct MyRadio {
//!     notifications: mpsc::Sender<RadioEvent>,
//! }
//!
//! #[async_trait]
//! impl Radio for MyRadio {
//!     async fn start(&self, _credentials: &StationCredentials) { /* arm station mode */ }
//!     async fn associate(&self) { /* issue one association attempt */ }
//! }
//!
//! // Platform glue: two-wire transactions against the sensor.
//! struct MyBus;
//!
//! #[async_trait]
//! impl LightBus for MyBus {
//!     async fn write_command(&mut self, _command: u8) -> Result<(), SensorError> { Ok(()) }
//!     async fn read_sample(&mut self) -> Result<[u8; 2], SensorError> { Ok([0, 0]) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_path("luxvisor.toml")?;
//!     let publisher = HttpPublisher::new(
//!         cfg.telemetry.endpoint.as_str(),
//!         cfg.device.id.as_str(),
//!         cfg.publish_timeout(),
//!     )?;
//!
//!     let (tx, rx) = mpsc::channel(8);
//!     let radio = Arc::new(MyRadio { notifications: tx });
//!
//!     let runtime = Runtime::new(cfg, Vec::new());
//!     runtime.run(radio, rx, Bh1750Channel::new(MyBus), publisher).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod link;
mod policies;
mod sensor;
mod subscribers;
mod telemetry;

// ---- Public re-exports ----

pub use crate::core::Runtime;
pub use config::{
    Config, DeviceConfig, NetworkConfig, RuntimeConfig, SensorConfig, TelemetryConfig,
};
pub use error::{ConfigError, RuntimeError, SensorError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use link::{LinkOutcome, LinkState, LinkSupervisor, Radio, RadioEvent, StationCredentials};
pub use policies::{BackoffPolicy, JitterPolicy, RetryCounter};
pub use sensor::{
    Acquisition, Bh1750Channel, LightBus, Reading, SensorChannel, SensorState, SensorSupervisor,
    BH1750_BUS_ADDRESS,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use telemetry::{Delivery, HttpPublisher, Publish};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
