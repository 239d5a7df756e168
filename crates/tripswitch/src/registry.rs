// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::sync::Mutex;

use hourglass::Clock;

use crate::constants::ERR_POISONED_LOCK;
use crate::{BreakerOptions, BreakerSnapshot, CircuitBreaker, ConfigError};

/// A named collection of breakers sharing one clock.
///
/// Registries are plain values: create one where the application wires up
/// its dependencies and pass it (or clones of individual breakers) to
/// whoever needs them. There is no process-wide registry.
///
/// Every breaker built through a registry reads time from the registry's
/// clock, so a test registry built from a controlled clock controls every
/// breaker in it at once.
#[derive(Debug)]
pub struct BreakerRegistry {
    clock: Clock,
    breakers: Mutex<HashMap<String, CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Creates an empty registry that builds breakers against `clock`.
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the breaker registered under the options' name, building it
    /// from the options if it does not exist yet.
    ///
    /// When a breaker with that name already exists, the options are
    /// ignored and the existing breaker is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the breaker does not exist yet and
    /// the options fail validation.
    pub fn get_or_build(&self, options: BreakerOptions) -> Result<CircuitBreaker, ConfigError> {
        let mut breakers = self.breakers.lock().expect(ERR_POISONED_LOCK);

        if let Some(breaker) = breakers.get(options.breaker_name()) {
            return Ok(breaker.clone());
        }

        let breaker = options.build(&self.clock)?;
        breakers.insert(breaker.name().to_owned(), breaker.clone());
        Ok(breaker)
    }

    /// Returns the breaker registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CircuitBreaker> {
        self.breakers.lock().expect(ERR_POISONED_LOCK).get(name).cloned()
    }

    /// Takes a snapshot of every registered breaker, keyed by name.
    ///
    /// Each snapshot is individually atomic; the collection as a whole is
    /// not, since breakers keep moving while it is assembled.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(String, BreakerSnapshot)> {
        let breakers = self.breakers.lock().expect(ERR_POISONED_LOCK);
        breakers
            .iter()
            .map(|(name, breaker)| (name.clone(), breaker.snapshot()))
            .collect()
    }

    /// Number of registered breakers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.breakers.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether the registry has no breakers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use super::*;
    use crate::CircuitState;

    static_assertions::assert_impl_all!(BreakerRegistry: Debug, Send, Sync);

    fn registry() -> BreakerRegistry {
        BreakerRegistry::new(&Clock::new_frozen())
    }

    #[test]
    fn builds_a_breaker_per_name() {
        let registry = registry();

        let first = registry
            .get_or_build(BreakerOptions::new().name("a"))
            .expect("valid options");
        let second = registry
            .get_or_build(BreakerOptions::new().name("b"))
            .expect("valid options");

        assert_eq!(first.name(), "a");
        assert_eq!(second.name(), "b");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn same_name_returns_the_same_breaker() {
        let registry = registry();

        let first = registry
            .get_or_build(BreakerOptions::new().name("shared").failure_threshold(1))
            .expect("valid options");
        let again = registry
            .get_or_build(BreakerOptions::new().name("shared").failure_threshold(99))
            .expect("valid options");

        // Later options are ignored; both handles share one circuit.
        assert_eq!(registry.len(), 1);
        drop(first);
        drop(again);
    }

    #[test]
    fn get_finds_registered_breakers_only() {
        let registry = registry();
        registry
            .get_or_build(BreakerOptions::new().name("known"))
            .expect("valid options");

        assert!(registry.get("known").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn invalid_options_are_not_registered() {
        let registry = registry();

        let result = registry.get_or_build(BreakerOptions::new().name("bad").failure_threshold(0));

        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshots_cover_every_breaker() {
        let registry = registry();
        registry
            .get_or_build(BreakerOptions::new().name("a"))
            .expect("valid options");
        registry
            .get_or_build(BreakerOptions::new().name("b"))
            .expect("valid options");

        let snapshots = registry.snapshots();

        assert_eq!(snapshots.len(), 2);
        assert!(snapshots
            .iter()
            .all(|(_, snapshot)| snapshot.state() == CircuitState::Closed));
    }
}
