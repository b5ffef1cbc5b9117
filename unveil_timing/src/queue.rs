// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deadline-ordered timer queue.

use alloc::collections::BTreeMap;

use hashbrown::HashMap;

/// Identifier for a timer scheduled on a [`TimerQueue`].
///
/// Ids are handed out in scheduling order and are never reused by the queue
/// that issued them, so a stale id can never cancel a newer timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number of this timer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A timer popped from the queue once its deadline was reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expired<T> {
    /// The id returned when the timer was scheduled.
    pub id: TimerId,
    /// The deadline the timer was scheduled for.
    pub deadline_ms: u64,
    /// The scheduled payload.
    pub payload: T,
}

/// A queue of payloads ordered by deadline.
///
/// Timers with equal deadlines expire in the order they were scheduled.
///
/// ```
/// use unveil_timing::TimerQueue;
///
/// let mut timers = TimerQueue::new();
/// let late = timers.schedule(300, "late");
/// timers.schedule(100, "early");
/// timers.cancel(late);
///
/// assert_eq!(timers.next_deadline(), Some(100));
/// assert_eq!(timers.pop_due(1_000).map(|t| t.payload), Some("early"));
/// assert!(timers.pop_due(1_000).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    /// Ordered by `(deadline, sequence)`.
    entries: BTreeMap<(u64, TimerId), T>,
    /// Deadline of every pending timer.
    deadlines: HashMap<TimerId, u64>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to expire at `deadline_ms`.
    pub fn schedule(&mut self, deadline_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline_ms, id), payload);
        self.deadlines.insert(id, deadline_ms);
        id
    }

    /// Cancels a pending timer, returning its payload.
    ///
    /// Returns `None` if the timer already expired or was already cancelled.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&id)?;
        self.entries.remove(&(deadline, id))
    }

    /// Returns `true` if `id` is still waiting to expire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Pops the earliest timer whose deadline is at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Expired<T>> {
        let &(deadline_ms, _) = self.entries.first_key_value()?.0;
        if deadline_ms > now_ms {
            return None;
        }
        let ((deadline_ms, id), payload) = self.entries.pop_first()?;
        self.deadlines.remove(&id);
        Some(Expired {
            id,
            deadline_ms,
            payload,
        })
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}
