// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::time::Duration;

/// Errors produced when breaker options fail validation.
///
/// Validation happens once, in [`BreakerOptions::build`][crate::BreakerOptions::build];
/// a breaker that was constructed successfully never re-validates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The consecutive-failure threshold must be at least one.
    #[error("failure threshold must be greater than zero")]
    ZeroFailureThreshold,

    /// The probe success threshold must be at least one.
    #[error("success threshold must be greater than zero")]
    ZeroSuccessThreshold,

    /// The reset timeout must be a positive duration.
    #[error("reset timeout must be greater than zero")]
    ZeroResetTimeout,

    /// The failure rate must fall within `(0.0, 1.0]`.
    #[error("failure rate must be within (0.0, 1.0], got {0}")]
    FailureRateOutOfRange(f32),

    /// The minimum throughput must be at least one call per window.
    #[error("minimum throughput must be greater than zero")]
    ZeroMinThroughput,

    /// The sampling duration must be a positive duration.
    #[error("sampling duration must be greater than zero")]
    ZeroSamplingDuration,
}

/// The circuit was open and the call was rejected without running.
///
/// Produced while the circuit is open, and also while it is half-open with
/// the single probe slot already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("circuit breaker is open")]
pub struct CircuitOpenError {
    pub(crate) retry_after: Option<Duration>,
}

impl CircuitOpenError {
    /// Time remaining until the circuit will consider admitting a probe.
    ///
    /// `None` when no estimate is available, for example when the rejection
    /// happened because another probe was already in flight.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

/// Why a guarded call did not produce a success.
///
/// Handed to the fallback so it can distinguish an operation that ran and
/// failed from a call the breaker refused to run at all.
#[derive(Debug, thiserror::Error)]
pub enum Rejection<E> {
    /// The operation ran and returned this error.
    #[error("operation failed")]
    Operation(E),

    /// The breaker rejected the call without invoking the operation.
    #[error("call rejected")]
    Open(#[source] CircuitOpenError),
}

impl<E> Rejection<E> {
    /// Returns the operation's error, if the operation actually ran.
    #[must_use]
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Open(_) => None,
        }
    }

    /// Returns the rejection details, if the breaker refused the call.
    #[must_use]
    pub fn as_open(&self) -> Option<&CircuitOpenError> {
        match self {
            Self::Operation(_) => None,
            Self::Open(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use super::*;

    static_assertions::assert_impl_all!(ConfigError: Debug, Send, Sync, Clone, std::error::Error);
    static_assertions::assert_impl_all!(CircuitOpenError: Debug, Send, Sync, Copy, std::error::Error);
    static_assertions::assert_impl_all!(Rejection<std::io::Error>: Debug, Send, Sync, std::error::Error);

    #[test]
    fn open_error_reports_retry_after() {
        let err = CircuitOpenError {
            retry_after: Some(Duration::from_millis(500)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_millis(500)));
        assert_eq!(err.to_string(), "circuit breaker is open");
    }

    #[test]
    fn rejection_splits_operation_and_open() {
        let operation: Rejection<&str> = Rejection::Operation("boom");
        assert_eq!(operation.into_operation_error(), Some("boom"));

        let open: Rejection<&str> = Rejection::Open(CircuitOpenError { retry_after: None });
        assert!(open.as_open().is_some());
        assert_eq!(open.into_operation_error(), None);
    }

    #[test]
    fn config_errors_render_the_offending_value() {
        let err = ConfigError::FailureRateOutOfRange(1.5);
        assert_eq!(err.to_string(), "failure rate must be within (0.0, 1.0], got 1.5");
    }
}
