//! # Sensor-channel boundary and the BH1750 wire protocol.
//!
//! [`SensorChannel`] is what the supervisor drives: acquire a reading, or
//! reinitialize after a failure. [`Bh1750Channel`] implements it for the
//! BH1750 ambient-light sensor on top of [`LightBus`], the narrow two-wire
//! transaction surface a platform provides (vendor I2C driver, bit-bang
//! implementation, test double).
//!
//! Arming the sensor is two command writes: power-on, then continuous
//! high-resolution mode. A sample is a single 2-byte big-endian read. The bus
//! implementation owns addressing (7-bit address [`BH1750_BUS_ADDRESS`]),
//! clocking (100 kHz nominal) and its per-transaction timeout (1 s in the
//! reference wiring).

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::SensorError;
use crate::sensor::reading::Reading;

/// 7-bit bus address of the BH1750 with ADDR pin low.
pub const BH1750_BUS_ADDRESS: u8 = 0x23;

/// Wake the part from power-down.
const CMD_POWER_ON: u8 = 0x01;
/// Continuous high-resolution measurement mode (1 lx resolution).
const CMD_CONT_HIGH_RES: u8 = 0x10;

/// Acquisition surface the sensor supervisor drives.
///
/// Both operations are transient-failure-prone; every [`SensorError`] is
/// handled the same way by the supervisor (degraded recovery loop), so
/// implementations should not encode retry semantics of their own.
#[async_trait]
pub trait SensorChannel: Send + 'static {
    /// Reads one sample and converts it to a [`Reading`].
    async fn acquire(&mut self) -> Result<Reading, SensorError>;

    /// Re-arms the sensor after a failure (also used once at startup).
    async fn reinitialize(&mut self) -> Result<(), SensorError>;
}

/// Two-wire bus transaction primitives for the light sensor.
#[async_trait]
pub trait LightBus: Send + 'static {
    /// Writes a single command byte to the sensor.
    async fn write_command(&mut self, command: u8) -> Result<(), SensorError>;

    /// Reads one 2-byte big-endian sample from the sensor.
    async fn read_sample(&mut self) -> Result<[u8; 2], SensorError>;
}

/// BH1750 channel over any [`LightBus`].
pub struct Bh1750Channel<B> {
    bus: B,
}

impl<B> Bh1750Channel<B> {
    /// Wraps a bus. The sensor is not armed until
    /// [`reinitialize`](SensorChannel::reinitialize) runs.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl<B: LightBus> SensorChannel for Bh1750Channel<B> {
    async fn acquire(&mut self) -> Result<Reading, SensorError> {
        let sample = self.bus.read_sample().await?;
        let raw = u16::from_be_bytes(sample);
        Ok(Reading::from_raw(raw, Instant::now().into_std()))
    }

    async fn reinitialize(&mut self) -> Result<(), SensorError> {
        self.bus.write_command(CMD_POWER_ON).await?;
        self.bus.write_command(CMD_CONT_HIGH_RES).await
    }
}
