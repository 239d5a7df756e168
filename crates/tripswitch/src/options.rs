// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use hourglass::Clock;

use crate::args::{OnClosedArgs, OnOpenedArgs, OnProbingArgs};
use crate::callbacks::{OnClosed, OnOpened, OnProbing};
use crate::constants::{DEFAULT_BREAKER_NAME, DEFAULT_RESET_TIMEOUT, DEFAULT_SUCCESS_THRESHOLD};
use crate::{CircuitBreaker, ConfigError, TripPolicy};

/// Configures and builds a [`CircuitBreaker`].
///
/// All settings have defaults; an unconfigured builder produces a breaker
/// that trips after five consecutive failures, stays open for five seconds,
/// and closes again after a single successful probe.
///
/// Settings are validated once, in [`build`][Self::build]. A value that can
/// never be satisfied — a zero threshold, a zero timeout — is rejected with
/// a [`ConfigError`] rather than silently clamped.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use hourglass::Clock;
/// use tripswitch::BreakerOptions;
///
/// # fn main() -> Result<(), tripswitch::ConfigError> {
/// let breaker = BreakerOptions::new()
///     .name("backend")
///     .failure_threshold(3)
///     .success_threshold(2)
///     .reset_timeout(Duration::from_secs(1))
///     .build(&Clock::new())?;
/// # let _ = breaker;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BreakerOptions {
    name: Cow<'static, str>,
    trip_policy: TripPolicy,
    success_threshold: u32,
    reset_timeout: Duration,
    on_opened: Option<OnOpened>,
    on_closed: Option<OnClosed>,
    on_probing: Option<OnProbing>,
}

impl BreakerOptions {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_BREAKER_NAME),
            trip_policy: TripPolicy::default(),
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
            on_opened: None,
            on_closed: None,
            on_probing: None,
        }
    }

    /// Sets the breaker's name, used in log events and as its registry key.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Trips the circuit after `failures` consecutive failures.
    ///
    /// Shorthand for [`trip_policy`][Self::trip_policy] with
    /// [`TripPolicy::Consecutive`].
    #[must_use]
    pub fn failure_threshold(self, failures: u32) -> Self {
        self.trip_policy(TripPolicy::Consecutive { failures })
    }

    /// Sets the policy that decides when a closed circuit trips.
    #[must_use]
    pub fn trip_policy(mut self, policy: TripPolicy) -> Self {
        self.trip_policy = policy;
        self
    }

    /// Sets how many probe successes close a half-open circuit.
    #[must_use]
    pub fn success_threshold(mut self, successes: u32) -> Self {
        self.success_threshold = successes;
        self
    }

    /// Sets how long the circuit stays open before admitting a probe.
    #[must_use]
    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Invokes the callback every time the circuit opens or reopens.
    #[must_use]
    pub fn on_opened<F>(mut self, callback: F) -> Self
    where
        F: Fn(OnOpenedArgs) + Send + Sync + 'static,
    {
        self.on_opened = Some(OnOpened::new(callback));
        self
    }

    /// Invokes the callback when the circuit closes after probing.
    #[must_use]
    pub fn on_closed<F>(mut self, callback: F) -> Self
    where
        F: Fn(OnClosedArgs) + Send + Sync + 'static,
    {
        self.on_closed = Some(OnClosed::new(callback));
        self
    }

    /// Invokes the callback when the circuit admits a probe call.
    #[must_use]
    pub fn on_probing<F>(mut self, callback: F) -> Self
    where
        F: Fn(OnProbingArgs) + Send + Sync + 'static,
    {
        self.on_probing = Some(OnProbing::new(callback));
        self
    }

    /// Validates the settings and builds the breaker.
    ///
    /// The breaker reads time through the given clock; pass a controlled
    /// clock in tests to drive the reset timeout manually.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first setting that failed
    /// validation.
    pub fn build(self, clock: &Clock) -> Result<CircuitBreaker, ConfigError> {
        self.trip_policy.validate()?;
        if self.success_threshold == 0 {
            return Err(ConfigError::ZeroSuccessThreshold);
        }
        if self.reset_timeout.is_zero() {
            return Err(ConfigError::ZeroResetTimeout);
        }

        Ok(CircuitBreaker::new(self, clock.clone()))
    }

    pub(crate) fn into_parts(self) -> OptionsParts {
        OptionsParts {
            name: self.name,
            trip_policy: self.trip_policy,
            success_threshold: self.success_threshold,
            reset_timeout: self.reset_timeout,
            on_opened: self.on_opened,
            on_closed: self.on_closed,
            on_probing: self.on_probing,
        }
    }

    pub(crate) fn breaker_name(&self) -> &str {
        &self.name
    }
}

impl Default for BreakerOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated settings, destructured for breaker construction.
pub(crate) struct OptionsParts {
    pub(crate) name: Cow<'static, str>,
    pub(crate) trip_policy: TripPolicy,
    pub(crate) success_threshold: u32,
    pub(crate) reset_timeout: Duration,
    pub(crate) on_opened: Option<OnOpened>,
    pub(crate) on_closed: Option<OnClosed>,
    pub(crate) on_probing: Option<OnProbing>,
}
