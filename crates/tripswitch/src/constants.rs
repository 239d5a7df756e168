// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::time::Duration;

/// Default name given to breakers that were not explicitly named.
pub(crate) const DEFAULT_BREAKER_NAME: &str = "default";

/// Default number of consecutive failures that trips the circuit.
pub(crate) const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default number of probe successes required to close the circuit again.
pub(crate) const DEFAULT_SUCCESS_THRESHOLD: u32 = 1;

/// Default time the circuit stays open before admitting a probe.
pub(crate) const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(5);

/// Default failure rate that trips the circuit under the rate policy.
pub(crate) const DEFAULT_FAILURE_RATE: f32 = 0.1;

/// Default minimum number of calls per sampling window before the rate
/// policy is allowed to trip the circuit.
pub(crate) const DEFAULT_MIN_THROUGHPUT: u32 = 100;

/// Default length of the sliding window the rate policy samples over.
pub(crate) const DEFAULT_SAMPLING_DURATION: Duration = Duration::from_secs(30);

/// Number of buckets the sampling window is divided into.
pub(crate) const WINDOW_BUCKETS: u32 = 10;

pub(crate) const ERR_POISONED_LOCK: &str =
    "poisoned lock - a thread panicked while updating the circuit";
