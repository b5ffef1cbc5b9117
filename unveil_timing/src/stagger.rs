// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stagger scheduler: fire named steps at fixed offsets from a shared start.
//!
//! ## Usage
//!
//! 1) Call [`StaggerScheduler::schedule`] with the start time and the ordered
//!    list of `(key, delay)` steps. Each step is due at `start + delay`; delays
//!    are absolute from the start, not cumulative, so a slow step never pushes
//!    back the ones after it.
//! 2) On every host turn, call [`StaggerScheduler::advance_to`] with the
//!    current time. Every due step is handed to the callback, ordered by due
//!    time and then by position in its list.
//! 3) Call [`StaggerScheduler::cancel`] to drop the steps that have not fired
//!    yet, for example when the view that scheduled them goes away.
//!
//! Use [`StaggerScheduler::next_deadline`] to arm a single host timer for the
//! earliest pending step instead of one timer per step.

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::queue::{TimerId, TimerQueue};

/// One named step of a stagger sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StaggerStep<K> {
    /// Caller-defined step key, handed back when the step fires.
    pub key: K,
    /// Offset from the schedule start, in milliseconds.
    pub delay_ms: u64,
}

impl<K> StaggerStep<K> {
    /// Creates a step firing `delay_ms` after the schedule starts.
    pub const fn new(key: K, delay_ms: u64) -> Self {
        Self { key, delay_ms }
    }
}

impl<K> From<(K, u64)> for StaggerStep<K> {
    fn from((key, delay_ms): (K, u64)) -> Self {
        Self::new(key, delay_ms)
    }
}

/// Handle to one scheduled stagger sequence.
///
/// Handles are never reused by the scheduler that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleHandle(u64);

#[derive(Clone, Debug)]
struct Schedule<K> {
    keys: Vec<K>,
    timers: Vec<TimerId>,
    remaining: usize,
}

/// Runs stagger sequences against host-supplied time.
///
/// The scheduler stores no callbacks: the host passes one to
/// [`advance_to`](Self::advance_to) on each turn, which keeps ownership simple
/// when the callback needs mutable access to the scheduler's owner.
#[derive(Clone, Debug)]
pub struct StaggerScheduler<K> {
    timers: TimerQueue<(ScheduleHandle, usize)>,
    schedules: HashMap<ScheduleHandle, Schedule<K>>,
    next_handle: u64,
}

impl<K> Default for StaggerScheduler<K> {
    fn default() -> Self {
        Self {
            timers: TimerQueue::new(),
            schedules: HashMap::new(),
            next_handle: 0,
        }
    }
}

impl<K> StaggerScheduler<K> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `steps` relative to `start_ms`.
    ///
    /// An empty step list is accepted and produces a handle that is already
    /// complete: nothing fires and [`is_active`](Self::is_active) is `false`.
    pub fn schedule<I>(&mut self, start_ms: u64, steps: I) -> ScheduleHandle
    where
        I: IntoIterator,
        I::Item: Into<StaggerStep<K>>,
    {
        let handle = ScheduleHandle(self.next_handle);
        self.next_handle += 1;

        let mut keys = Vec::new();
        let mut timers = Vec::new();
        for (index, step) in steps.into_iter().map(Into::into).enumerate() {
            let due = start_ms.saturating_add(step.delay_ms);
            timers.push(self.timers.schedule(due, (handle, index)));
            keys.push(step.key);
        }

        if !keys.is_empty() {
            let remaining = keys.len();
            self.schedules.insert(
                handle,
                Schedule {
                    keys,
                    timers,
                    remaining,
                },
            );
        }
        handle
    }

    /// Cancels every step of `handle` that has not fired yet.
    ///
    /// Returns how many steps were dropped. Cancelling a completed, cancelled,
    /// or unknown handle returns `0`.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> usize {
        let Some(schedule) = self.schedules.remove(&handle) else {
            return 0;
        };
        schedule
            .timers
            .into_iter()
            .filter(|&id| self.timers.cancel(id).is_some())
            .count()
    }

    /// Fires every step due at or before `now_ms`.
    ///
    /// Steps fire in due-time order; steps due at the same time fire in the
    /// order they were scheduled, which for a single sequence is list order.
    /// Returns the number of steps fired.
    pub fn advance_to<F>(&mut self, now_ms: u64, mut on_fire: F) -> usize
    where
        F: FnMut(ScheduleHandle, &K),
    {
        let mut fired = 0;
        while let Some(expired) = self.timers.pop_due(now_ms) {
            let (handle, index) = expired.payload;
            let Some(schedule) = self.schedules.get_mut(&handle) else {
                continue;
            };
            on_fire(handle, &schedule.keys[index]);
            fired += 1;
            schedule.remaining -= 1;
            if schedule.remaining == 0 {
                self.schedules.remove(&handle);
            }
        }
        fired
    }

    /// Returns `true` while `handle` still has steps waiting to fire.
    #[must_use]
    pub fn is_active(&self, handle: ScheduleHandle) -> bool {
        self.schedules.contains_key(&handle)
    }

    /// Number of steps of `handle` that have not fired yet.
    #[must_use]
    pub fn pending(&self, handle: ScheduleHandle) -> usize {
        self.schedules.get(&handle).map_or(0, |s| s.remaining)
    }

    /// Earliest time at which a pending step is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Number of active sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    /// Returns `true` if no sequence is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}
