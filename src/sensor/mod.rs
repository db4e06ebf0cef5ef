//! Sensor acquisition and supervision.
//!
//! ## Contents
//! - [`Reading`] — immutable illuminance value and the raw-sample conversion
//! - [`SensorChannel`], [`LightBus`], [`Bh1750Channel`] — the sensor
//!   collaborator boundary and the BH1750 wire protocol over it
//! - [`SensorSupervisor`], [`SensorState`], [`Acquisition`] — the
//!   read/retry/reinitialize state machine
//!
//! The supervisor never terminates the sequence: a degraded sensor is retried
//! with backoff indefinitely, and exhaustion of the retry cap is an
//! observation (logged once per degraded run), not a stop condition.

mod channel;
mod reading;
mod supervisor;

pub use channel::{Bh1750Channel, LightBus, SensorChannel, BH1750_BUS_ADDRESS};
pub use reading::Reading;
pub use supervisor::{Acquisition, SensorState, SensorSupervisor};
