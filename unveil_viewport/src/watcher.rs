// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The watcher contract shared by every visibility source.

use alloc::vec::Vec;
use core::fmt;

/// Opaque handle for one observation of one target.
///
/// Handles are never reused by the watcher that issued them, so releasing a
/// stale handle can never release a newer observation of the same target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionHandle(pub(crate) u64);

/// A visibility threshold crossing.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEvent<T> {
    /// Subscription the crossing belongs to.
    pub handle: SubscriptionHandle,
    /// The observed target.
    pub target: T,
    /// `true` when the target became visible, `false` when it stopped being visible.
    pub visible: bool,
    /// Host time of the update that caused the crossing, in milliseconds.
    pub at_ms: u64,
    /// Visibility measure at the time of the crossing.
    ///
    /// For intersection watchers this is the visible fraction of the target
    /// in `[0, 1]`; for scroll watchers it is the scroll offset expressed in
    /// viewport heights.
    pub ratio: f64,
}

/// Error returned by [`ViewportWatcher::observe`].
#[derive(Clone, Debug, PartialEq)]
pub enum ObserveError<T> {
    /// The threshold was NaN, infinite, or outside `[0, 1]`.
    ThresholdOutOfRange(f64),
    /// The target already has a live subscription on this watcher.
    AlreadyObserved(T),
}

impl<T: fmt::Debug> fmt::Display for ObserveError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOutOfRange(t) => {
                write!(f, "visibility threshold {t} is outside [0, 1]")
            }
            Self::AlreadyObserved(target) => write!(f, "target {target:?} is already observed"),
        }
    }
}

impl<T: fmt::Debug> core::error::Error for ObserveError<T> {}

/// Validates a visibility threshold.
///
/// Accepts any finite value in `[0, 1]`.
///
/// ```
/// use unveil_viewport::check_threshold;
///
/// assert!(check_threshold::<()>(0.1).is_ok());
/// assert!(check_threshold::<()>(1.5).is_err());
/// assert!(check_threshold::<()>(f64::NAN).is_err());
/// ```
pub fn check_threshold<T>(threshold: f64) -> Result<f64, ObserveError<T>> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(ObserveError::ThresholdOutOfRange(threshold))
    }
}

/// A source of visibility crossings for registered targets.
///
/// Implementations queue events as the host updates them; consumers collect
/// the queue once per host turn with [`drain_events`](Self::drain_events).
/// Every update carries the host time it happened at, so a consumer that
/// drains late still knows when each crossing occurred.
pub trait ViewportWatcher<T> {
    /// Starts observing `target` with the given threshold.
    ///
    /// Fails if `threshold` is not in `[0, 1]` or if `target` is already
    /// observed by this watcher.
    fn observe(&mut self, target: T, threshold: f64) -> Result<SubscriptionHandle, ObserveError<T>>;

    /// Stops an observation.
    ///
    /// Returns `true` if the subscription was live. Releasing a handle twice,
    /// or a handle this watcher never issued, is a no-op.
    fn unobserve(&mut self, handle: SubscriptionHandle) -> bool;

    /// Moves every queued event into `out`, oldest first.
    fn drain_events(&mut self, out: &mut Vec<VisibilityEvent<T>>);

    /// Returns every queued event, oldest first.
    fn take_events(&mut self) -> Vec<VisibilityEvent<T>> {
        let mut out = Vec::new();
        self.drain_events(&mut out);
        out
    }
}
