// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use hourglass::Clock;

use crate::args::{OnClosedArgs, OnOpenedArgs, OnProbingArgs};
use crate::callbacks::{OnClosed, OnOpened, OnProbing};
use crate::gate::{
    Admission, CallMode, CallOutcome, CircuitGate, GateCore, GateOptions, GateTelemetry,
    Settlement,
};
use crate::options::BreakerOptions;
use crate::{BreakerSnapshot, CircuitOpenError, CircuitState, Rejection};

/// Guards calls to an unreliable dependency.
///
/// The breaker starts closed and lets calls through while tallying
/// failures. Once the trip policy is satisfied it opens: calls are rejected
/// outright and routed to their fallback until the reset timeout elapses.
/// The next call after that runs as a single probe; enough probe successes
/// close the circuit, one probe failure reopens it for a full timeout.
///
/// Cloning a breaker is cheap and every clone shares the same circuit, so a
/// breaker can guard the same dependency from many tasks at once.
///
/// # Examples
///
/// ```
/// use tripswitch::{CircuitBreaker, Rejection};
///
/// # async fn example(breaker: &CircuitBreaker) -> Result<String, MyError> {
/// breaker
///     .execute(
///         || fetch_quote(),
///         |_rejection: Rejection<MyError>| Ok("cached quote".to_owned()),
///     )
///     .await
/// # }
/// # #[derive(Debug)] struct MyError;
/// # async fn fetch_quote() -> Result<String, MyError> { Ok(String::new()) }
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    name: Cow<'static, str>,
    gate: GateTelemetry<GateCore>,
    on_opened: Option<OnOpened>,
    on_closed: Option<OnClosed>,
    on_probing: Option<OnProbing>,
}

impl CircuitBreaker {
    /// Builds a breaker from validated options.
    pub(crate) fn new(options: BreakerOptions, clock: Clock) -> Self {
        let parts = options.into_parts();
        let core = GateCore::new(
            GateOptions {
                trip_policy: parts.trip_policy,
                success_threshold: parts.success_threshold,
                reset_timeout: parts.reset_timeout,
            },
            clock,
        );

        Self {
            shared: Arc::new(Shared {
                gate: GateTelemetry::new(core, parts.name.clone()),
                name: parts.name,
                on_opened: parts.on_opened,
                on_closed: parts.on_closed,
                on_probing: parts.on_probing,
            }),
        }
    }

    /// The breaker's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The circuit's current state.
    ///
    /// Like a [`snapshot`][Self::snapshot], the answer can be outdated by
    /// the time the caller looks at it.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.shared.gate.snapshot().state()
    }

    /// Takes a point-in-time snapshot of the circuit's state and counters.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        self.shared.gate.snapshot()
    }

    /// Runs `operation` through the circuit, falling back on failure.
    ///
    /// While the circuit is closed the operation runs and its result is
    /// returned, except that an `Err` is first offered to `fallback`
    /// wrapped in [`Rejection::Operation`]. While the circuit is open the
    /// operation is never invoked; `fallback` receives
    /// [`Rejection::Open`] instead.
    ///
    /// The fallback decides the final result: it can substitute a value,
    /// translate the error, or return it unchanged.
    ///
    /// # Errors
    ///
    /// Returns whatever error the fallback produces.
    pub async fn execute<T, E, Fut, Op, Fb>(&self, operation: Op, fallback: Fb) -> Result<T, E>
    where
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Fb: FnOnce(Rejection<E>) -> Result<T, E>,
    {
        match self.try_execute(operation).await {
            Ok(value) => Ok(value),
            Err(rejection) => fallback(rejection),
        }
    }

    /// Runs `operation` through the circuit without a fallback.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Operation`] when the operation ran and failed,
    /// or [`Rejection::Open`] when the circuit rejected the call without
    /// running it.
    pub async fn try_execute<T, E, Fut, Op>(&self, operation: Op) -> Result<T, Rejection<E>>
    where
        Op: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mode = match self.shared.gate.admit() {
            Admission::Admitted { mode } => mode,
            Admission::Rejected { retry_after } => {
                return Err(Rejection::Open(CircuitOpenError { retry_after }));
            }
        };

        if mode == CallMode::Probe {
            if let Some(on_probing) = &self.shared.on_probing {
                on_probing.call(OnProbingArgs::default());
            }
        }

        // The gate is not held across the await; the outcome is fed back
        // through `settle` once the operation finishes.
        let result = operation().await;

        let outcome = match &result {
            Ok(_) => CallOutcome::Success,
            Err(_) => CallOutcome::Failure,
        };
        let settlement = self.shared.gate.settle(outcome, mode);
        self.notify(settlement);

        result.map_err(Rejection::Operation)
    }

    fn notify(&self, settlement: Settlement) {
        match settlement {
            Settlement::Opened { times_opened } | Settlement::Reopened { times_opened } => {
                if let Some(on_opened) = &self.shared.on_opened {
                    on_opened.call(OnOpenedArgs { times_opened });
                }
            }
            Settlement::Closed { open_duration } => {
                if let Some(on_closed) = &self.shared.on_closed {
                    on_closed.call(OnClosedArgs { open_duration });
                }
            }
            Settlement::Unchanged => {}
        }
    }
}
