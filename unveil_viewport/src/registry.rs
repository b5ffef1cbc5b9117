// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscription bookkeeping shared by the watcher implementations.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::watcher::{ObserveError, SubscriptionHandle, VisibilityEvent, check_threshold};

#[derive(Clone, Debug)]
pub(crate) struct Observation<T> {
    pub(crate) target: T,
    pub(crate) threshold: f64,
    pub(crate) visible: bool,
    pub(crate) ratio: f64,
}

/// Live observations plus the queue of crossings not yet drained.
#[derive(Clone, Debug)]
pub(crate) struct Registry<T> {
    by_handle: HashMap<SubscriptionHandle, Observation<T>>,
    by_target: HashMap<T, SubscriptionHandle>,
    queued: Vec<VisibilityEvent<T>>,
    next_handle: u64,
    /// Latest host time seen by `record`.
    last_ms: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            by_handle: HashMap::new(),
            by_target: HashMap::new(),
            queued: Vec::new(),
            next_handle: 0,
            last_ms: 0,
        }
    }
}

impl<T: Clone + Eq + Hash> Registry<T> {
    pub(crate) fn observe(
        &mut self,
        target: T,
        threshold: f64,
    ) -> Result<SubscriptionHandle, ObserveError<T>> {
        let threshold = check_threshold::<T>(threshold)?;
        if self.by_target.contains_key(&target) {
            return Err(ObserveError::AlreadyObserved(target));
        }
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.by_target.insert(target.clone(), handle);
        self.by_handle.insert(
            handle,
            Observation {
                target,
                threshold,
                visible: false,
                ratio: 0.0,
            },
        );
        Ok(handle)
    }

    pub(crate) fn unobserve(&mut self, handle: SubscriptionHandle) -> bool {
        let Some(observation) = self.by_handle.remove(&handle) else {
            return false;
        };
        self.by_target.remove(&observation.target);
        self.queued.retain(|event| event.handle != handle);
        true
    }

    pub(crate) fn handle_of<Q>(&self, target: &Q) -> Option<SubscriptionHandle>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_target.get(target).copied()
    }

    pub(crate) fn get(&self, handle: SubscriptionHandle) -> Option<&Observation<T>> {
        self.by_handle.get(&handle)
    }

    /// Live handles in the order they were issued.
    pub(crate) fn handles(&self) -> Vec<SubscriptionHandle> {
        let mut handles: Vec<_> = self.by_handle.keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    pub(crate) fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub(crate) fn last_ms(&self) -> u64 {
        self.last_ms
    }

    /// Records a new measurement, queuing an event if visibility flipped.
    ///
    /// `decide` maps the observation's threshold to the new visibility.
    pub(crate) fn record(
        &mut self,
        handle: SubscriptionHandle,
        ratio: f64,
        at_ms: u64,
        decide: impl FnOnce(f64) -> bool,
    ) -> bool {
        self.last_ms = self.last_ms.max(at_ms);
        let Some(observation) = self.by_handle.get_mut(&handle) else {
            return false;
        };
        observation.ratio = ratio;
        let visible = decide(observation.threshold);
        if visible == observation.visible {
            return false;
        }
        observation.visible = visible;
        self.queued.push(VisibilityEvent {
            handle,
            target: observation.target.clone(),
            visible,
            ratio,
            at_ms,
        });
        true
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<VisibilityEvent<T>>) {
        out.append(&mut self.queued);
    }
}
