//! Retry and backoff policies.
//!
//! This module groups the knobs that control **how many** consecutive failures
//! a supervisor tolerates and **how long** it waits between recovery rounds.
//!
//! ## Contents
//! - [`RetryCounter`] bounded failure accounting, one instance per supervisor
//! - [`BackoffPolicy`] how recovery delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization strategy for fleets of stations
//!
//! ## Quick wiring
//! ```text
//! LinkSupervisor   { retries: RetryCounter }              — gives up at the cap
//! SensorSupervisor { retries: RetryCounter,
//!                    backoff: BackoffPolicy }             — retries forever,
//!                                                           flags exhaustion once
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → constant 1 s (the reference recovery cadence).
//! - `JitterPolicy::None` by default; consider `Equal` for large fleets.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryCounter;
