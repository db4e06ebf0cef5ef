//! # Light readings and raw-sample conversion.
//!
//! The sensor reports illuminance as a 16-bit big-endian counter; the
//! physical quantity is `lux = raw / 1.2` (the BH1750 measurement accuracy
//! divisor). The full 16-bit range is valid input and the conversion applies
//! no rounding or clamping beyond plain floating-point division.

use std::time::Instant;

/// Counts-per-lux divisor from the BH1750 datasheet.
const LUX_DIVISOR: f64 = 1.2;

/// One immutable illuminance reading.
///
/// Constructed from a raw sensor sample, so `lux()` is always non-negative.
/// "No reading available" is expressed by
/// [`Acquisition::Skipped`](crate::Acquisition::Skipped), never by a sentinel
/// value, and a skipped acquisition never reaches the publisher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    lux: f64,
    at: Instant,
}

impl Reading {
    /// Converts a raw 16-bit sample taken at `at` into a reading.
    pub fn from_raw(raw: u16, at: Instant) -> Self {
        Self {
            lux: f64::from(raw) / LUX_DIVISOR,
            at,
        }
    }

    /// Illuminance in lux.
    #[inline]
    pub fn lux(&self) -> f64 {
        self.lux
    }

    /// Monotonic acquisition instant.
    #[inline]
    pub fn at(&self) -> Instant {
        self.at
    }
}
