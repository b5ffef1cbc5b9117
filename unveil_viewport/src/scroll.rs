// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-offset watcher.
//!
//! Some pages trigger reveals from the scroll position alone, without any
//! element geometry: a target becomes visible once the page has scrolled
//! further than `threshold` viewport heights. The comparison is strict, so a
//! target with threshold `0.2` in a 1000px viewport becomes visible at a
//! scroll offset of 201px, not 200px.
//!
//! ```
//! use unveil_viewport::{ScrollWatcher, ViewportWatcher};
//!
//! let mut watcher = ScrollWatcher::new();
//! watcher.observe("mission", 0.2).unwrap();
//! watcher.observe("values", 0.4).unwrap();
//!
//! watcher.set_scroll(250.0, 1_000.0, 0);
//! let events = watcher.take_events();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].target, "mission");
//! ```

use alloc::vec::Vec;
use core::hash::Hash;

use crate::registry::Registry;
use crate::watcher::{ObserveError, SubscriptionHandle, ViewportWatcher, VisibilityEvent};

/// Reports targets as visible once the scroll offset passes a fraction of the viewport height.
#[derive(Clone, Debug)]
pub struct ScrollWatcher<T> {
    registry: Registry<T>,
    scroll_y: f64,
    viewport_height: f64,
}

impl<T> Default for ScrollWatcher<T> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            scroll_y: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl<T: Clone + Eq + Hash> ScrollWatcher<T> {
    /// Creates a watcher at scroll offset zero with an unknown viewport height.
    ///
    /// Nothing becomes visible until [`set_scroll`](Self::set_scroll) supplies a
    /// viewport height.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current vertical scroll offset.
    #[must_use]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Current viewport height.
    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Updates the scroll offset and viewport height at host time `at_ms`,
    /// re-evaluating every target.
    pub fn set_scroll(&mut self, scroll_y: f64, viewport_height: f64, at_ms: u64) {
        self.scroll_y = scroll_y;
        self.viewport_height = viewport_height;
        for handle in self.registry.handles() {
            self.evaluate(handle, at_ms);
        }
    }

    /// Number of live observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    fn evaluate(&mut self, handle: SubscriptionHandle, at_ms: u64) {
        let (scroll_y, height) = (self.scroll_y, self.viewport_height);
        if height <= 0.0 {
            return;
        }
        self.registry
            .record(handle, scroll_y / height, at_ms, |threshold| {
                scroll_y > height * threshold
            });
    }
}

impl<T: Clone + Eq + Hash> ViewportWatcher<T> for ScrollWatcher<T> {
    fn observe(
        &mut self,
        target: T,
        threshold: f64,
    ) -> Result<SubscriptionHandle, ObserveError<T>> {
        let handle = self.registry.observe(target, threshold)?;
        // A page that is already scrolled past the threshold reports at once,
        // stamped with the last scroll update.
        let at_ms = self.registry.last_ms();
        self.evaluate(handle, at_ms);
        Ok(handle)
    }

    fn unobserve(&mut self, handle: SubscriptionHandle) -> bool {
        self.registry.unobserve(handle)
    }

    fn drain_events(&mut self, out: &mut Vec<VisibilityEvent<T>>) {
        self.registry.drain_into(out);
    }
}
