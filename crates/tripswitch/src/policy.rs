// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::constants::{
    DEFAULT_FAILURE_RATE, DEFAULT_FAILURE_THRESHOLD, DEFAULT_MIN_THROUGHPUT,
    DEFAULT_SAMPLING_DURATION, WINDOW_BUCKETS,
};
use crate::gate::CallOutcome;
use crate::ConfigError;

/// Decides when a closed circuit should trip open.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TripPolicy {
    /// Trips after a run of consecutive failures.
    ///
    /// Any success resets the run to zero. This is the default policy, with
    /// a threshold of five failures.
    Consecutive {
        /// Number of consecutive failures that trips the circuit.
        failures: u32,
    },

    /// Trips when the failure rate over a sliding window is too high.
    ///
    /// The rate is only acted upon once the window has seen at least
    /// `min_throughput` calls, so a handful of failures during a quiet
    /// period cannot trip the circuit.
    FailureRate {
        /// Failure rate within `(0.0, 1.0]` that trips the circuit.
        failure_threshold: f32,

        /// Minimum number of calls in the window before the rate applies.
        min_throughput: u32,

        /// Length of the sliding sampling window.
        sampling_duration: Duration,
    },
}

impl TripPolicy {
    /// A failure-rate policy with the default rate, throughput, and window.
    #[must_use]
    pub fn failure_rate() -> Self {
        Self::FailureRate {
            failure_threshold: DEFAULT_FAILURE_RATE,
            min_throughput: DEFAULT_MIN_THROUGHPUT,
            sampling_duration: DEFAULT_SAMPLING_DURATION,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::Consecutive { failures } => {
                if failures == 0 {
                    return Err(ConfigError::ZeroFailureThreshold);
                }
            }
            Self::FailureRate {
                failure_threshold,
                min_throughput,
                sampling_duration,
            } => {
                if !(failure_threshold > 0.0 && failure_threshold <= 1.0) {
                    return Err(ConfigError::FailureRateOutOfRange(failure_threshold));
                }
                if min_throughput == 0 {
                    return Err(ConfigError::ZeroMinThroughput);
                }
                if sampling_duration.is_zero() {
                    return Err(ConfigError::ZeroSamplingDuration);
                }
            }
        }
        Ok(())
    }

    /// Creates a fresh tally for this policy. Called once at construction
    /// and again every time the circuit closes.
    pub(crate) fn tally(&self) -> Tally {
        match *self {
            Self::Consecutive { failures } => Tally::Consecutive {
                threshold: failures,
                failures: 0,
            },
            Self::FailureRate {
                failure_threshold,
                min_throughput,
                sampling_duration,
            } => Tally::Window(WindowTally::new(
                failure_threshold,
                min_throughput,
                sampling_duration,
            )),
        }
    }
}

impl Default for TripPolicy {
    fn default() -> Self {
        Self::Consecutive {
            failures: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Running failure bookkeeping for a closed circuit.
#[derive(Debug)]
pub(crate) enum Tally {
    Consecutive { threshold: u32, failures: u32 },
    Window(WindowTally),
}

impl Tally {
    pub(crate) fn record(&mut self, outcome: CallOutcome, now: Instant) {
        match self {
            Self::Consecutive { failures, .. } => match outcome {
                CallOutcome::Success => *failures = 0,
                CallOutcome::Failure => *failures = failures.saturating_add(1),
            },
            Self::Window(window) => window.record(outcome, now),
        }
    }

    pub(crate) fn should_trip(&self) -> bool {
        match self {
            Self::Consecutive {
                threshold,
                failures,
            } => failures >= threshold,
            Self::Window(window) => window.should_trip(),
        }
    }

    /// Failures currently counted toward the trip decision.
    pub(crate) fn failure_count(&self) -> u32 {
        match self {
            Self::Consecutive { failures, .. } => *failures,
            Self::Window(window) => window.failure_count(),
        }
    }
}

/// Sliding window of call outcomes, divided into fixed-size buckets.
///
/// Recording an outcome first drops buckets that have aged out of the
/// sampling window, then adds the outcome to the current bucket, starting a
/// new one if the latest bucket is full-width. The trip decision aggregates
/// across all live buckets.
#[derive(Debug)]
pub(crate) struct WindowTally {
    failure_threshold: f32,
    min_throughput: u32,
    sampling_duration: Duration,
    bucket_duration: Duration,
    buckets: VecDeque<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    started_at: Instant,
    successes: u32,
    failures: u32,
}

impl WindowTally {
    fn new(failure_threshold: f32, min_throughput: u32, sampling_duration: Duration) -> Self {
        Self {
            failure_threshold,
            min_throughput,
            sampling_duration,
            bucket_duration: sampling_duration / WINDOW_BUCKETS,
            buckets: VecDeque::with_capacity(WINDOW_BUCKETS as usize + 1),
        }
    }

    fn record(&mut self, outcome: CallOutcome, now: Instant) {
        self.evict_expired(now);

        let needs_new_bucket = match self.buckets.back() {
            Some(back) => now.duration_since(back.started_at) >= self.bucket_duration,
            None => true,
        };
        if needs_new_bucket {
            self.buckets.push_back(Bucket {
                started_at: now,
                successes: 0,
                failures: 0,
            });
        }

        // Non-empty by construction.
        if let Some(bucket) = self.buckets.back_mut() {
            match outcome {
                CallOutcome::Success => bucket.successes = bucket.successes.saturating_add(1),
                CallOutcome::Failure => bucket.failures = bucket.failures.saturating_add(1),
            }
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        loop {
            match self.buckets.front() {
                Some(front)
                    if now.duration_since(front.started_at) > self.sampling_duration =>
                {
                    self.buckets.pop_front();
                }
                _ => break,
            }
        }
    }

    fn should_trip(&self) -> bool {
        let (successes, failures) = self.totals();
        let throughput = successes + failures;
        if throughput < u64::from(self.min_throughput) {
            return false;
        }

        // Throughput is non-zero here, so the division is well-defined.
        #[allow(clippy::cast_precision_loss)]
        let rate = failures as f32 / throughput as f32;
        rate >= self.failure_threshold
    }

    fn failure_count(&self) -> u32 {
        let (_, failures) = self.totals();
        u32::try_from(failures).unwrap_or(u32::MAX)
    }

    fn totals(&self) -> (u64, u64) {
        self.buckets.iter().fold((0, 0), |(s, f), bucket| {
            (s + u64::from(bucket.successes), f + u64::from(bucket.failures))
        })
    }
}
