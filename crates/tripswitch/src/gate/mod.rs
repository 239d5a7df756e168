// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

//! The admit/settle protocol that drives a breaker's state machine.
//!
//! Every guarded call makes two passes through the gate: [`admit`] before
//! the operation runs, deciding whether it may run and in what role, and
//! [`settle`] after it finishes, feeding the outcome back into the state
//! machine. Both passes are synchronous and never block on the operation
//! itself.
//!
//! [`admit`]: CircuitGate::admit
//! [`settle`]: CircuitGate::settle

mod core;
mod telemetry;

pub(crate) use self::core::{GateCore, GateOptions};
pub(crate) use self::telemetry::GateTelemetry;

use std::time::Duration;

use crate::BreakerSnapshot;

/// How a call was let through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallMode {
    /// An ordinary call through a closed circuit.
    Normal,

    /// The single recovery probe of a half-open circuit.
    Probe,
}

/// What a guarded call produced, as far as the circuit is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallOutcome {
    Success,
    Failure,
}

#[cfg(any(feature = "logs", test))]
impl CallOutcome {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// The gate's decision before a call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// The call may run.
    Admitted { mode: CallMode },

    /// The call must not run; invoke the fallback instead.
    Rejected { retry_after: Option<Duration> },
}

/// State change produced by settling a call's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settlement {
    /// The circuit stayed where it was.
    Unchanged,

    /// A closed circuit tripped open.
    Opened { times_opened: u64 },

    /// A half-open circuit reopened after a failed probe.
    Reopened { times_opened: u64 },

    /// A half-open circuit closed after enough successful probes.
    Closed { open_duration: Duration },
}

/// A circuit breaker state machine.
///
/// Implementations must be safe to call from multiple threads at once and
/// must never block beyond short internal critical sections.
pub(crate) trait CircuitGate: Send + Sync {
    /// Decides whether a call may run right now.
    fn admit(&self) -> Admission;

    /// Feeds a finished call's outcome back into the state machine.
    ///
    /// `mode` must be the mode the call was admitted with. Results from
    /// calls that outlived the state they were admitted in are counted as
    /// stale and do not move the circuit.
    fn settle(&self, outcome: CallOutcome, mode: CallMode) -> Settlement;

    /// Takes an atomic point-in-time snapshot of the circuit.
    fn snapshot(&self) -> BreakerSnapshot;
}
