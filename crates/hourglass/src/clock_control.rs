// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use crate::{Clock, ClockState};

const ERR_POISONED_LOCK: &str = "poisoned lock - a thread panicked while controlling time";

/// Controls the flow of time in tests.
///
/// This is useful for testing time-sensitive code without having to wait for
/// real time to pass. `ClockControl` is available when the `test-util`
/// feature is enabled.
///
/// To create a [`Clock`] from `ClockControl`, use the
/// [`to_clock`][Self::to_clock] method. All clocks created from the same
/// control (and their clones) observe the same controlled time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use hourglass::ClockControl;
///
/// let control = ClockControl::new();
/// let clock = control.to_clock();
///
/// let start = clock.instant();
///
/// // Advance the time by one second
/// control.advance(Duration::from_secs(1));
///
/// assert_eq!(clock.instant().duration_since(start), Duration::from_secs(1));
/// ```
///
/// # Production code and `ClockControl`
///
/// Never enable the `test-util` feature in production code; always keep it
/// confined to `dev-dependencies`.
#[derive(Debug, Clone)]
pub struct ClockControl {
    /// Controlling the flow of time must be consistent across threads, so
    /// the state lives behind a mutex shared by all clones.
    state: Arc<Mutex<ManualTime>>,
}

#[derive(Debug)]
struct ManualTime {
    instant: Instant,
    system_time: SystemTime,
}

impl ManualTime {
    fn new(system_time: SystemTime) -> Self {
        Self {
            // An arbitrary fixed origin; only differences between instants
            // handed out by the same control are meaningful.
            instant: Instant::now(),
            system_time,
        }
    }
}

impl ClockControl {
    /// Creates a new `ClockControl` instance.
    ///
    /// The initial absolute time is set to the UNIX epoch and time does not
    /// advance until [`advance`][Self::advance] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::new_at(SystemTime::UNIX_EPOCH)
    }

    /// Creates a new `ClockControl` instance at the specified absolute time.
    #[must_use]
    pub fn new_at(time: impl Into<SystemTime>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualTime::new(time.into()))),
        }
    }

    /// Creates a [`Clock`] that reads this control's time.
    #[must_use]
    pub fn to_clock(&self) -> Clock {
        Clock(Arc::new(ClockState::Controlled(self.clone())))
    }

    /// Advances the controlled time by the given duration.
    ///
    /// # Panics
    ///
    /// Panics if the advance would overflow the representable time range.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        state.instant = state
            .instant
            .checked_add(duration)
            .expect("advanced beyond the representable instant range");
        state.system_time = state
            .system_time
            .checked_add(duration)
            .expect("advanced beyond the representable system time range");
    }

    /// Advances the controlled time by the given number of milliseconds.
    ///
    /// Shorthand for [`advance`][Self::advance] with a millisecond duration.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub(crate) fn instant(&self) -> Instant {
        self.state.lock().expect(ERR_POISONED_LOCK).instant
    }

    pub(crate) fn system_time(&self) -> SystemTime {
        self.state.lock().expect(ERR_POISONED_LOCK).system_time
    }
}

impl Default for ClockControl {
    fn default() -> Self {
        Self::new()
    }
}
