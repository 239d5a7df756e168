// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::ClockState;

/// Provides an abstraction for time-related operations.
///
/// The clock is used for:
///
/// - Retrieving the current monotonic time via [`instant()`][Self::instant].
/// - Retrieving the current absolute time via [`system_time()`][Self::system_time].
///
/// Prefer [`instant()`][Self::instant] for measuring elapsed time and
/// computing deadlines; it is monotonic and unaffected by system clock
/// changes. Absolute time is only useful when interoperating with other
/// crates that expect [`SystemTime`].
///
/// # Cloning and shared state
///
/// Cloning a clock is inexpensive (just an `Arc` clone) and every clone
/// shares the same underlying state, including — when the `test-util`
/// feature is enabled — the controlled passage of time. Time adjustments
/// performed through a [`ClockControl`][crate::ClockControl] are visible to
/// every clock created from it.
///
/// # Testing
///
/// With the `test-util` feature enabled, construct clocks via
/// [`ClockControl`][crate::ClockControl] (or the [`Clock::new_frozen`]
/// shorthand) to gain complete control over the passage of time. A
/// controlled clock never advances on its own.
#[derive(Debug, Clone)]
pub struct Clock(pub(crate) Arc<ClockState>);

impl Clock {
    /// Creates a clock backed by the operating system's time sources.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(ClockState::System))
    }

    /// Creates a new frozen clock.
    ///
    /// This is a convenience method equivalent to calling
    /// `ClockControl::new().to_clock()`.
    ///
    /// > **Note**: The returned clock will not advance time on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use hourglass::Clock;
    ///
    /// let clock = Clock::new_frozen();
    ///
    /// // The frozen clock returns the same instant on every call.
    /// assert_eq!(clock.instant(), clock.instant());
    /// ```
    #[cfg(any(feature = "test-util", test))]
    #[must_use]
    pub fn new_frozen() -> Self {
        crate::ClockControl::new().to_clock()
    }

    /// Retrieves the current monotonic [`Instant`].
    ///
    /// An `Instant` represents a monotonic time point guaranteed to never
    /// decrease. Unlike [`system_time`][Self::system_time], it is not
    /// affected by system clock changes.
    ///
    /// > **Important**: When measuring elapsed time, use
    /// > [`Instant::duration_since`] against another instant retrieved from
    /// > the clock rather than `Instant::elapsed`. The `elapsed` method
    /// > bypasses the clock and reads system time directly, so it won't
    /// > respect controlled time in tests.
    #[must_use]
    pub fn instant(&self) -> Instant {
        match self.0.as_ref() {
            ClockState::System => Instant::now(),
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.instant(),
        }
    }

    /// Retrieves the current system time as [`SystemTime`].
    ///
    /// > **Note**: The system time is not monotonic and can be affected by
    /// > system clock changes. For relative time measurements, use
    /// > [`instant`][Self::instant].
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        match self.0.as_ref() {
            ClockState::System => SystemTime::now(),
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.system_time(),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Self> for Clock {
    fn as_ref(&self) -> &Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;
    use std::thread::sleep;
    use std::time::Duration;

    use super::*;
    use crate::ClockControl;

    static_assertions::assert_impl_all!(Clock: Debug, Send, Sync, Clone, AsRef<Clock>);

    #[test]
    fn system_clock_advances() {
        let clock = Clock::new();

        let instant1 = clock.instant();
        let instant2 = clock.instant();

        assert!(instant2 >= instant1);
    }

    #[test]
    fn system_time_is_close_to_now() {
        let before = SystemTime::now();
        let clock = Clock::new();

        assert!(clock.system_time() >= before);
    }

    #[test]
    fn default_is_system_clock() {
        let clock = Clock::default();
        assert!(matches!(clock.0.as_ref(), ClockState::System));
    }

    #[test]
    fn frozen_clock_does_not_advance() {
        let clock = Clock::new_frozen();

        let instant = clock.instant();
        let system_time = clock.system_time();

        sleep(Duration::from_micros(1));

        assert_eq!(instant, clock.instant());
        assert_eq!(system_time, clock.system_time());
    }

    #[test]
    fn controlled_clock_observes_advances() {
        let control = ClockControl::new();
        let clock = control.to_clock();

        let start = clock.instant();
        control.advance(Duration::from_secs(10));

        assert_eq!(clock.instant().duration_since(start), Duration::from_secs(10));
    }

    #[test]
    fn clones_share_controlled_time() {
        let control = ClockControl::new();
        let clock = control.to_clock();
        let clone = clock.clone();

        control.advance(Duration::from_secs(1));

        assert_eq!(clock.instant(), clone.instant());
    }

    #[test]
    fn as_ref_returns_self() {
        let clock = Clock::new_frozen();
        let _: &Clock = clock.as_ref();
    }
}
