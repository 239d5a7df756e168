// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::borrow::Cow;

use crate::gate::{Admission, CallMode, CallOutcome, CircuitGate, Settlement};
use crate::BreakerSnapshot;

/// Wrapper around a circuit gate that reports state changes as tracing
/// events. With the `logs` feature disabled this is a transparent
/// pass-through.
#[derive(Debug)]
pub(crate) struct GateTelemetry<T> {
    inner: T,
    #[cfg(any(feature = "logs", test))]
    name: Cow<'static, str>,
}

impl<T> GateTelemetry<T> {
    pub(crate) fn new(inner: T, name: Cow<'static, str>) -> Self {
        #[cfg(not(any(feature = "logs", test)))]
        let _ = name;

        Self {
            inner,
            #[cfg(any(feature = "logs", test))]
            name,
        }
    }
}

impl<T: CircuitGate> CircuitGate for GateTelemetry<T> {
    fn admit(&self) -> Admission {
        let admission = self.inner.admit();

        #[cfg(any(feature = "logs", test))]
        if let Admission::Rejected { retry_after } = admission {
            tracing::event!(
                name: "tripswitch.breaker.rejected",
                tracing::Level::WARN,
                breaker.name = self.name.as_ref(),
                circuit.state = crate::CircuitState::Open.as_str(),
                circuit.retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
            );
        }

        admission
    }

    fn settle(&self, outcome: CallOutcome, mode: CallMode) -> Settlement {
        #[cfg(any(feature = "logs", test))]
        if mode == CallMode::Probe {
            tracing::event!(
                name: "tripswitch.breaker.probe",
                tracing::Level::INFO,
                breaker.name = self.name.as_ref(),
                circuit.state = crate::CircuitState::HalfOpen.as_str(),
                circuit.probe.result = outcome.as_str(),
            );
        }

        let settlement = self.inner.settle(outcome, mode);

        #[cfg(any(feature = "logs", test))]
        match settlement {
            Settlement::Opened { times_opened } => {
                tracing::event!(
                    name: "tripswitch.breaker.opened",
                    tracing::Level::WARN,
                    breaker.name = self.name.as_ref(),
                    circuit.state = crate::CircuitState::Open.as_str(),
                    circuit.times_opened = times_opened,
                );
            }
            Settlement::Closed { open_duration } => {
                tracing::event!(
                    name: "tripswitch.breaker.closed",
                    tracing::Level::INFO,
                    breaker.name = self.name.as_ref(),
                    circuit.state = crate::CircuitState::Closed.as_str(),
                    circuit.open.duration_ms = open_duration.as_millis() as u64,
                );
            }
            Settlement::Reopened { .. } | Settlement::Unchanged => {
                // Reopening is already visible through the preceding probe
                // failure event, and no-ops are not worth reporting.
            }
        }

        settlement
    }

    fn snapshot(&self) -> BreakerSnapshot {
        self.inner.snapshot()
    }
}
