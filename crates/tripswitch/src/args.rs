// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use std::time::Duration;

/// Arguments passed to the `on_opened` callback.
///
/// Fired every time the circuit opens, whether it tripped from closed or
/// reopened after a failed probe.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct OnOpenedArgs {
    pub(crate) times_opened: u64,
}

impl OnOpenedArgs {
    /// Total number of times this circuit has opened, this one included.
    #[must_use]
    pub fn times_opened(&self) -> u64 {
        self.times_opened
    }
}

/// Arguments passed to the `on_closed` callback.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct OnClosedArgs {
    pub(crate) open_duration: Duration,
}

impl OnClosedArgs {
    /// Time elapsed between the circuit opening and closing again.
    #[must_use]
    pub fn open_duration(&self) -> Duration {
        self.open_duration
    }
}

/// Arguments passed to the `on_probing` callback.
///
/// Fired when the circuit admits a probe call after the reset timeout.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct OnProbingArgs {}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use super::*;

    static_assertions::assert_impl_all!(OnOpenedArgs: Debug, Send, Sync, Copy);
    static_assertions::assert_impl_all!(OnClosedArgs: Debug, Send, Sync, Copy);
    static_assertions::assert_impl_all!(OnProbingArgs: Debug, Send, Sync, Copy);
}
