//! # HTTP publisher for the remote collector.
//!
//! POSTs each reading as JSON to a configured endpoint:
//!
//! ```text
//! POST <endpoint>
//! Content-Type: application/json
//!
//! {"device_id": "<id>", "lux": <value, 2 decimal places>}
//! ```
//!
//! The client enforces the configured timeout per request. The response
//! status code is returned in the [`Delivery`] receipt for logging; it is
//! never inspected here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::TransportError;
use crate::sensor::Reading;
use crate::telemetry::publisher::{Delivery, Publish};

/// JSON body of one telemetry record.
#[derive(Debug, Serialize)]
struct TelemetryRecord<'a> {
    device_id: &'a str,
    lux: f64,
}

/// Rounds to two decimal places, matching the collector's ingest format.
fn round_to_hundredths(lux: f64) -> f64 {
    (lux * 100.0).round() / 100.0
}

/// Publishes readings over HTTP POST.
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
    device_id: String,
    timeout: Duration,
}

impl HttpPublisher {
    /// Builds a publisher with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        device_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Transport {
                reason: err.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            device_id: device_id.into(),
            timeout,
        })
    }
}

#[async_trait]
impl Publish for HttpPublisher {
    async fn publish(&self, reading: &Reading) -> Result<Delivery, TransportError> {
        let record = TelemetryRecord {
            device_id: &self.device_id,
            lux: round_to_hundredths(reading.lux()),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&record)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransportError::Timeout {
                        timeout: self.timeout,
                    }
                } else {
                    TransportError::Transport {
                        reason: err.to_string(),
                    }
                }
            })?;

        Ok(Delivery {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_record_shape_matches_collector_ingest() {
        let record = TelemetryRecord {
            device_id: "bh1750",
            lux: 54_612.5,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"device_id": "bh1750", "lux": 54612.5}));
    }

    #[test]
    fn test_lux_is_rounded_to_two_decimals() {
        assert_eq!(round_to_hundredths(10.456), 10.46);
        assert_eq!(round_to_hundredths(0.0), 0.0);
        assert_eq!(round_to_hundredths(54_612.5), 54_612.5);
        assert_eq!(round_to_hundredths(0.004), 0.0);
    }
}
