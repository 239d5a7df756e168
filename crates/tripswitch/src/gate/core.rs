// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use hourglass::Clock;

use crate::constants::ERR_POISONED_LOCK;
use crate::gate::{Admission, CallMode, CallOutcome, CircuitGate, Settlement};
use crate::policy::{Tally, TripPolicy};
use crate::{BreakerSnapshot, CircuitState};

/// Validated settings a gate operates with.
#[derive(Debug, Clone)]
pub(crate) struct GateOptions {
    pub(crate) trip_policy: TripPolicy,
    pub(crate) success_threshold: u32,
    pub(crate) reset_timeout: Duration,
}

/// The circuit breaker state machine proper.
///
/// All mutable state lives behind a single mutex, held only for the few
/// instructions it takes to transition. The clock is read before taking
/// the lock so a slow time source cannot extend the critical section.
#[derive(Debug)]
pub(crate) struct GateCore {
    inner: Mutex<Inner>,
    options: GateOptions,
    clock: Clock,
}

#[derive(Debug)]
struct Inner {
    state: State,
    counters: Counters,
}

#[derive(Debug)]
enum State {
    Closed {
        tally: Tally,
    },
    Open {
        opened_at: Instant,
        open_until: Instant,
    },
    HalfOpen {
        opened_at: Instant,
        probe_in_flight: bool,
        probe_successes: u32,
    },
}

#[derive(Debug, Default)]
struct Counters {
    rejected_calls: u64,
    stale_results: u64,
    times_opened: u64,
}

impl GateCore {
    pub(crate) fn new(options: GateOptions, clock: Clock) -> Self {
        let tally = options.trip_policy.tally();
        Self {
            inner: Mutex::new(Inner {
                state: State::Closed { tally },
                counters: Counters::default(),
            }),
            options,
            clock,
        }
    }
}

impl CircuitGate for GateCore {
    fn admit(&self) -> Admission {
        let now = self.clock.instant();
        let mut inner = self.inner.lock().expect(ERR_POISONED_LOCK);
        inner.admit(now)
    }

    fn settle(&self, outcome: CallOutcome, mode: CallMode) -> Settlement {
        let now = self.clock.instant();
        let mut inner = self.inner.lock().expect(ERR_POISONED_LOCK);
        inner.settle(outcome, mode, now, &self.options)
    }

    fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock().expect(ERR_POISONED_LOCK);
        inner.snapshot()
    }
}

impl Inner {
    fn admit(&mut self, now: Instant) -> Admission {
        match self.state {
            State::Closed { .. } => Admission::Admitted {
                mode: CallMode::Normal,
            },

            State::Open {
                opened_at,
                open_until,
            } => {
                if now < open_until {
                    self.counters.rejected_calls += 1;
                    return Admission::Rejected {
                        retry_after: Some(open_until.duration_since(now)),
                    };
                }

                // Reset timeout elapsed; this call becomes the probe.
                self.state = State::HalfOpen {
                    opened_at,
                    probe_in_flight: true,
                    probe_successes: 0,
                };
                Admission::Admitted {
                    mode: CallMode::Probe,
                }
            }

            State::HalfOpen {
                ref mut probe_in_flight,
                ..
            } => {
                if *probe_in_flight {
                    self.counters.rejected_calls += 1;
                    return Admission::Rejected { retry_after: None };
                }
                *probe_in_flight = true;
                Admission::Admitted {
                    mode: CallMode::Probe,
                }
            }
        }
    }

    fn settle(
        &mut self,
        outcome: CallOutcome,
        mode: CallMode,
        now: Instant,
        options: &GateOptions,
    ) -> Settlement {
        match (&mut self.state, mode) {
            (State::Closed { tally }, CallMode::Normal) => {
                tally.record(outcome, now);
                if !tally.should_trip() {
                    return Settlement::Unchanged;
                }
                self.open(now, options)
            }

            (State::HalfOpen { probe_in_flight, .. }, CallMode::Probe)
                if !*probe_in_flight =>
            {
                self.stale()
            }

            (
                State::HalfOpen {
                    opened_at,
                    probe_in_flight,
                    probe_successes,
                },
                CallMode::Probe,
            ) => {
                *probe_in_flight = false;
                match outcome {
                    CallOutcome::Failure => self.open(now, options),
                    CallOutcome::Success => {
                        *probe_successes += 1;
                        if *probe_successes < options.success_threshold {
                            return Settlement::Unchanged;
                        }
                        let open_duration = now.duration_since(*opened_at);
                        self.state = State::Closed {
                            tally: options.trip_policy.tally(),
                        };
                        Settlement::Closed { open_duration }
                    }
                }
            }

            // The circuit moved on while this call was in flight; its
            // result no longer has a state to apply to.
            _ => self.stale(),
        }
    }

    /// Moves to `Open`, from either `Closed` (tripped) or `HalfOpen`
    /// (failed probe).
    fn open(&mut self, now: Instant, options: &GateOptions) -> Settlement {
        let reopened = matches!(self.state, State::HalfOpen { .. });
        self.counters.times_opened += 1;
        self.state = State::Open {
            opened_at: now,
            open_until: now + options.reset_timeout,
        };

        let times_opened = self.counters.times_opened;
        if reopened {
            Settlement::Reopened { times_opened }
        } else {
            Settlement::Opened { times_opened }
        }
    }

    fn stale(&mut self) -> Settlement {
        self.counters.stale_results += 1;
        Settlement::Unchanged
    }

    fn snapshot(&self) -> BreakerSnapshot {
        let (state, failure_tally, probe_successes) = match &self.state {
            State::Closed { tally } => (CircuitState::Closed, tally.failure_count(), 0),
            State::Open { .. } => (CircuitState::Open, 0, 0),
            State::HalfOpen {
                probe_successes, ..
            } => (CircuitState::HalfOpen, 0, *probe_successes),
        };

        BreakerSnapshot {
            state,
            failure_tally,
            probe_successes,
            rejected_calls: self.counters.rejected_calls,
            stale_results: self.counters.stale_results,
            times_opened: self.counters.times_opened,
        }
    }
}
