// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

//! Integration tests for the guarded-call protocol using only public API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hourglass::ClockControl;
use tripswitch::{BreakerOptions, CircuitBreaker, CircuitState, Rejection, TripPolicy};

const RESET_TIMEOUT: Duration = Duration::from_millis(1_000);

fn breaker(control: &ClockControl) -> CircuitBreaker {
    BreakerOptions::new()
        .name("guarded")
        .failure_threshold(3)
        .success_threshold(2)
        .reset_timeout(RESET_TIMEOUT)
        .build(&control.to_clock())
        .expect("valid options")
}

async fn fail(breaker: &CircuitBreaker) {
    let result: Result<(), Rejection<&str>> =
        breaker.try_execute(|| async { Err("downstream unavailable") }).await;
    assert!(result.is_err());
}

async fn succeed(breaker: &CircuitBreaker) {
    let result: Result<(), Rejection<&str>> = breaker.try_execute(|| async { Ok(()) }).await;
    assert!(result.is_ok());
}

/// Drives the breaker open with a run of consecutive failures.
async fn trip(breaker: &CircuitBreaker) {
    for _ in 0..3 {
        fail(breaker).await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test]
async fn successes_never_open_the_circuit() {
    let control = ClockControl::new();
    let breaker = breaker(&control);

    for _ in 0..1_000 {
        succeed(&breaker).await;
    }

    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.snapshot().times_opened(), 0);
}

#[tokio::test]
async fn opens_after_exactly_the_failure_threshold() {
    let control = ClockControl::new();
    let breaker = breaker(&control);

    fail(&breaker).await;
    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Closed);

    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);
}

#[tokio::test]
async fn open_circuit_routes_to_the_fallback_without_calling_the_operation() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    trip(&breaker).await;

    control.advance_millis(500);

    let calls = AtomicU32::new(0);
    let result: Result<&str, &str> = breaker
        .execute(
            || {
                calls.fetch_add(1, Ordering::Relaxed);
                async { Ok("live") }
            },
            |rejection| {
                let open = rejection.as_open().expect("rejected while open");
                // Half the timeout has elapsed, half remains.
                assert_eq!(open.retry_after(), Some(Duration::from_millis(500)));
                Ok("cached")
            },
        )
        .await;

    assert_eq!(result, Ok("cached"));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn probes_after_the_reset_timeout_and_closes_on_enough_successes() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    trip(&breaker).await;

    // t=500ms: still open.
    control.advance_millis(500);
    let result: Result<(), Rejection<&str>> = breaker.try_execute(|| async { Ok(()) }).await;
    assert!(matches!(result, Err(Rejection::Open(_))));

    // t=1100ms: the next call runs as a probe and succeeds.
    control.advance_millis(600);
    succeed(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert_eq!(breaker.snapshot().probe_successes(), 1);

    // Second probe success reaches the success threshold.
    succeed(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn a_failed_probe_reopens_for_a_full_timeout() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    trip(&breaker).await;

    control.advance(RESET_TIMEOUT);
    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    // Part of the new timeout is not enough.
    control.advance_millis(999);
    let result: Result<(), Rejection<&str>> = breaker.try_execute(|| async { Ok(()) }).await;
    assert!(matches!(result, Err(Rejection::Open(_))));

    control.advance_millis(1);
    succeed(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_probe_runs_at_a_time() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    trip(&breaker).await;
    control.advance(RESET_TIMEOUT);

    let (release, hold) = tokio::sync::oneshot::channel::<()>();
    let attempts = Arc::new(AtomicU32::new(0));

    // The first call claims the probe slot and parks inside the operation.
    let probe = tokio::spawn({
        let breaker = breaker.clone();
        let attempts = Arc::clone(&attempts);
        async move {
            breaker
                .try_execute(|| async move {
                    attempts.fetch_add(1, Ordering::Relaxed);
                    hold.await.ok();
                    Ok::<_, &str>(())
                })
                .await
        }
    });

    while attempts.load(Ordering::Relaxed) == 0 {
        tokio::task::yield_now().await;
    }

    // Every other caller is turned away while the probe is in flight.
    for _ in 0..8 {
        let result: Result<(), Rejection<&str>> = breaker.try_execute(|| async { Ok(()) }).await;
        assert!(matches!(result, Err(Rejection::Open(_))));
    }
    assert_eq!(attempts.load(Ordering::Relaxed), 1);

    release.send(()).expect("probe is waiting");
    probe.await.expect("probe task").expect("probe succeeded");

    assert_eq!(breaker.snapshot().probe_successes(), 1);
}

#[tokio::test]
async fn fallback_can_translate_operation_errors() {
    let control = ClockControl::new();
    let breaker = breaker(&control);

    let result: Result<u32, &str> = breaker
        .execute(
            || async { Err("downstream unavailable") },
            |rejection| match rejection {
                Rejection::Operation(err) => {
                    assert_eq!(err, "downstream unavailable");
                    Ok(0)
                }
                Rejection::Open(_) => Err("circuit should be closed"),
            },
        )
        .await;

    assert_eq!(result, Ok(0));
}

#[tokio::test]
async fn rate_policy_trips_on_failure_rate() {
    let control = ClockControl::new();
    let breaker = BreakerOptions::new()
        .name("rated")
        .trip_policy(TripPolicy::FailureRate {
            failure_threshold: 0.5,
            min_throughput: 10,
            sampling_duration: Duration::from_secs(10),
        })
        .reset_timeout(RESET_TIMEOUT)
        .build(&control.to_clock())
        .expect("valid options");

    // 50% failures, but the throughput floor holds the circuit closed.
    for _ in 0..4 {
        succeed(&breaker).await;
        fail(&breaker).await;
    }
    assert_eq!(breaker.state(), CircuitState::Closed);

    succeed(&breaker).await;
    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);
}
