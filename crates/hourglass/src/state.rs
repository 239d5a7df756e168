// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

/// Backing time source of a [`Clock`][crate::Clock].
#[derive(Debug)]
pub(crate) enum ClockState {
    /// Reads the operating system's time sources.
    System,

    /// Reads manually controlled time. Only available in tests.
    #[cfg(any(feature = "test-util", test))]
    Controlled(crate::ClockControl),
}
