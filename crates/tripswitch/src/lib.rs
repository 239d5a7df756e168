// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

//! Circuit breaker for calls to unreliable dependencies.
//!
//! A [`CircuitBreaker`] wraps calls to a dependency and tracks how they
//! fare. While the dependency is healthy the circuit is *closed* and calls
//! flow through. When failures satisfy the configured [`TripPolicy`] the
//! circuit *opens*: calls are rejected immediately, without touching the
//! dependency, and are routed to a caller-supplied fallback. After the
//! reset timeout the circuit goes *half-open* and lets exactly one probe
//! call through at a time; enough successful probes close the circuit,
//! a failed probe opens it again.
//!
//! # Quick start
//!
//! ```
//! use std::time::Duration;
//!
//! use hourglass::Clock;
//! use tripswitch::{BreakerOptions, Rejection};
//!
//! # #[derive(Debug)] struct FetchError;
//! # async fn fetch_rate() -> Result<f64, FetchError> { Ok(1.0) }
//! # async fn example() -> Result<(), tripswitch::ConfigError> {
//! let breaker = BreakerOptions::new()
//!     .name("rates")
//!     .failure_threshold(3)
//!     .reset_timeout(Duration::from_secs(1))
//!     .build(&Clock::new())?;
//!
//! let rate = breaker
//!     .execute(
//!         || fetch_rate(),
//!         |_rejection: Rejection<FetchError>| Ok(1.0), // last known rate
//!     )
//!     .await;
//! # let _ = rate;
//! # Ok(())
//! # }
//! ```
//!
//! # Trip policies
//!
//! The default policy trips after five consecutive failures. For high
//! traffic dependencies where occasional failures are normal, use
//! [`TripPolicy::FailureRate`] to trip on the failure rate over a sliding
//! window instead.
//!
//! # Observing the circuit
//!
//! [`BreakerOptions`] accepts callbacks for state transitions, and
//! [`CircuitBreaker::snapshot`] returns an atomic view of the circuit's
//! state and counters. With the `logs` feature enabled, transitions,
//! rejections, and probes are also emitted as `tracing` events.
//!
//! # Testing
//!
//! Breakers read time through an [`hourglass::Clock`]. Build against a
//! clock created from a `ClockControl` (behind hourglass's `test-util`
//! feature) to step through reset timeouts without sleeping.

mod args;
mod breaker;
mod callbacks;
mod constants;
mod error;
mod fn_wrapper;
mod gate;
mod options;
mod policy;
mod registry;
mod state;

pub use args::{OnClosedArgs, OnOpenedArgs, OnProbingArgs};
pub use breaker::CircuitBreaker;
pub use error::{CircuitOpenError, ConfigError, Rejection};
pub use options::BreakerOptions;
pub use policy::TripPolicy;
pub use registry::BreakerRegistry;
pub use state::{BreakerSnapshot, CircuitState};
