// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

//! Primitives for obtaining and mocking machine time, enabling faster and
//! more robust testing of time-dependent code.
//!
//! # Why?
//!
//! Working with time is notoriously difficult to test: code that waits for a
//! cooldown to elapse either sleeps in tests (slow, flaky) or reads the real
//! clock (untestable). This crate provides a [`Clock`] handle that reads the
//! operating system's time sources in production, and — when the `test-util`
//! feature is enabled — a [`ClockControl`] that lets tests advance time
//! manually, instantly, and deterministically.
//!
//! Code using [`Clock`] works identically in production and tests; the
//! testability machinery compiles away when `test-util` is disabled.
//!
//! # Quick Start
//!
//! ```
//! use hourglass::Clock;
//!
//! fn elapsed_check(clock: &Clock) -> std::time::Instant {
//!     clock.instant()
//! }
//!
//! let clock = Clock::new();
//! let earlier = elapsed_check(&clock);
//! assert!(elapsed_check(&clock) >= earlier);
//! ```
//!
//! # Testing
//!
//! ```
//! # #[cfg(feature = "test-util")] {
//! use std::time::Duration;
//!
//! use hourglass::ClockControl;
//!
//! let control = ClockControl::new();
//! let clock = control.to_clock();
//!
//! let start = clock.instant();
//! control.advance(Duration::from_secs(60));
//!
//! assert_eq!(clock.instant().duration_since(start), Duration::from_secs(60));
//! # }
//! ```
//!
//! The `test-util` feature should only ever be enabled from
//! `dev-dependencies`; manual time control has no place in production code.

mod clock;
pub use clock::Clock;

#[cfg(any(feature = "test-util", test))]
mod clock_control;
#[cfg(any(feature = "test-util", test))]
pub use clock_control::ClockControl;

mod state;
pub(crate) use state::ClockState;
