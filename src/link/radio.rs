//! # Radio-management collaborator boundary.
//!
//! The radio stack lives outside this crate (vendor driver, simulator, test
//! double). The [`Radio`] trait covers the two control operations the link
//! supervisor needs; progress is reported back asynchronously as
//! [`RadioEvent`] notifications over an `mpsc` channel owned by the
//! supervisor.
//!
//! ```text
//!  LinkSupervisor ── start()/associate() ──► Radio (driver context)
//!        ▲                                      │
//!        └───────── mpsc<RadioEvent> ◄──────────┘
//! ```
//!
//! The channel is the single concurrency boundary of the system: the driver
//! context only sends notifications, the supervisor only receives them, and
//! all link state lives on the supervisor side.

use std::fmt;
use std::net::Ipv4Addr;

use async_trait::async_trait;

/// WPA2-PSK station credentials for the access point.
#[derive(Clone)]
pub struct StationCredentials {
    /// Network SSID.
    pub ssid: String,
    /// Pre-shared key.
    pub passphrase: String,
}

impl fmt::Debug for StationCredentials {
    // Keep the passphrase out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationCredentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &"***")
            .finish()
    }
}

/// Notifications delivered by the radio stack's event context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioEvent {
    /// Station mode is up; the initial association attempt may be issued.
    StartRequested,
    /// The association dropped or an attempt failed.
    Disconnected,
    /// DHCP completed; the station holds an address.
    AddressAcquired(Ipv4Addr),
}

/// Control surface of the radio stack.
///
/// Implementations do not report association progress through return values:
/// outcomes arrive as [`RadioEvent`] notifications on the channel handed to
/// the [`LinkSupervisor`](crate::LinkSupervisor). A driver that fails to issue
/// an attempt reports that the same way the air does — with a
/// [`RadioEvent::Disconnected`].
#[async_trait]
pub trait Radio: Send + Sync + 'static {
    /// Arms station mode with the given credentials and starts the radio.
    ///
    /// Completion means the start request was accepted, not that the link is
    /// up.
    async fn start(&self, credentials: &StationCredentials);

    /// Issues one association attempt.
    async fn associate(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_passphrase() {
        let credentials = StationCredentials {
            ssid: "lab".into(),
            passphrase: "secret".into(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("lab"));
        assert!(!rendered.contains("secret"));
    }
}
