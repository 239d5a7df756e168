// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

//! Guarded-call example that simulates a service outage and recovery:
//!
//! 1. Calls flow through while the service is healthy
//! 2. The circuit opens after a run of consecutive failures
//! 3. Rejected calls are served from the fallback
//! 4. A probe discovers the recovery and the circuit closes again

use std::time::Duration;

use hourglass::Clock;
use tripswitch::{BreakerOptions, ConfigError, Rejection};

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt().init();

    let breaker = BreakerOptions::new()
        .name("quote_service")
        .failure_threshold(3)
        .success_threshold(2)
        // Short timeout to speed up the example
        .reset_timeout(Duration::from_millis(500))
        .on_opened(|args| println!("circuit opened (opened {} times so far)", args.times_opened()))
        .on_probing(|_| println!("probe let through to see if the service recovered"))
        .on_closed(|args| {
            println!(
                "circuit closed after probing succeeded, was open for {}ms",
                args.open_duration().as_millis()
            );
        })
        .build(&Clock::new())?;

    for attempt in 0..25_u32 {
        tokio::time::sleep(Duration::from_millis(100)).await;

        let quote = breaker
            .execute(
                || fetch_quote(attempt),
                |rejection: Rejection<String>| match rejection {
                    // The service is down or the circuit is open; either
                    // way the cached quote keeps the caller going.
                    Rejection::Operation(_) | Rejection::Open(_) => Ok("cached-quote".to_owned()),
                },
            )
            .await;

        match quote {
            Ok(quote) => println!("{attempt}: {quote}"),
            Err(err) => println!("{attempt}: failed with {err}"),
        }
    }

    Ok(())
}

// Simulated downstream: an outage starting at attempt 5 and ending at 15.
async fn fetch_quote(attempt: u32) -> Result<String, String> {
    if (5..15).contains(&attempt) {
        Err(format!("transient error for attempt {attempt}"))
    } else {
        Ok(format!("quote-{attempt}"))
    }
}
