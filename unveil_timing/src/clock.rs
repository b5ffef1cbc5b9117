// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources.

use alloc::rc::Rc;
use core::cell::Cell;

/// A monotonic millisecond time source.
///
/// Controllers read the clock whenever they need "now": when a section is
/// registered, and on every host turn. Implementations must never go
/// backwards.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Virtual time, advanced explicitly by the owner.
///
/// Clones share the same underlying time, so a test can hand one clone to a
/// controller and keep another to move time forward.
///
/// ```
/// use unveil_timing::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
/// clock.advance(250);
/// assert_eq!(shared.now_ms(), 250);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock at the given time.
    #[must_use]
    pub fn at(now_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_ms)),
        }
    }

    /// Moves time to `now_ms`.
    ///
    /// Earlier times are ignored; the clock is monotonic.
    pub fn set(&self, now_ms: u64) {
        if now_ms > self.now.get() {
            self.now.set(now_ms);
        }
    }

    /// Moves time forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Wall-clock time, in milliseconds since the clock was created.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Creates a clock whose zero is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
