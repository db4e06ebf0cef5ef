//! # Event subscribers for the luxvisor runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery for
//! handling runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   supervisors ── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet
//!                                                                      │
//!                                                       ┌──────────────┼─────────┐
//!                                                       ▼              ▼         ▼
//!                                                   LogWriter       Metrics    Custom
//! ```
//!
//! Subscribers observe; they never steer. Retry decisions, cadence, and
//! outcomes are owned by the supervisors regardless of what any subscriber
//! does with the events.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
