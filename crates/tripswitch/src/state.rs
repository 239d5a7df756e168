// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

/// The externally observable state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Calls flow through normally while failures are tallied.
    Closed,

    /// Calls are rejected without invoking the operation.
    Open,

    /// A single probe call is allowed through to test recovery.
    HalfOpen,
}

impl CircuitState {
    /// Returns the state as a static string, suitable for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time view of a breaker's state and counters.
///
/// Snapshots are taken atomically: the state and every counter come from the
/// same moment. They are cheap to copy and safe to hold, but they go stale
/// immediately — a concurrent call can change the breaker right after the
/// snapshot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub(crate) state: CircuitState,
    pub(crate) failure_tally: u32,
    pub(crate) probe_successes: u32,
    pub(crate) rejected_calls: u64,
    pub(crate) stale_results: u64,
    pub(crate) times_opened: u64,
}

impl BreakerSnapshot {
    /// The state the breaker was in when the snapshot was taken.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Failures currently counted toward tripping the circuit.
    ///
    /// Under the consecutive policy this is the current run of failures;
    /// under the rate policy it is the number of failures in the sampling
    /// window. Zero unless the circuit is closed.
    #[must_use]
    pub fn failure_tally(&self) -> u32 {
        self.failure_tally
    }

    /// Probe successes recorded in the current half-open episode.
    ///
    /// Zero unless the circuit is half-open.
    #[must_use]
    pub fn probe_successes(&self) -> u32 {
        self.probe_successes
    }

    /// Total calls rejected without invoking the operation.
    #[must_use]
    pub fn rejected_calls(&self) -> u64 {
        self.rejected_calls
    }

    /// Total call results that arrived too late to influence the circuit.
    ///
    /// A result is stale when the circuit moved on while the call was in
    /// flight, for example a slow call finishing after the circuit already
    /// reopened.
    #[must_use]
    pub fn stale_results(&self) -> u64 {
        self.stale_results
    }

    /// Total number of times the circuit has opened, reopens included.
    #[must_use]
    pub fn times_opened(&self) -> u64 {
        self.times_opened
    }
}
