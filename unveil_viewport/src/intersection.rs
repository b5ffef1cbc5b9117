// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersection-ratio watcher.
//!
//! ## Usage
//!
//! 1) Create the watcher with the current viewport rectangle, in the same
//!    document coordinates as the targets.
//! 2) [`observe`](ViewportWatcher::observe) each target with its threshold.
//! 3) Feed geometry as layout or scrolling changes, either as rectangles via
//!    [`IntersectionWatcher::set_target_rect`] and
//!    [`IntersectionWatcher::set_viewport`], or as ratios the platform already
//!    computed via [`IntersectionWatcher::report_ratio`].
//! 4) Drain crossings once per host turn.
//!
//! A threshold of `0` means "any intersection", edge contact included. Any
//! other threshold `t` means the visible fraction of the target is at least `t`.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::registry::Registry;
use crate::watcher::{ObserveError, SubscriptionHandle, ViewportWatcher, VisibilityEvent};

/// Visible fraction of `target` inside `root`.
///
/// Returns `None` when the rectangles do not touch at all. Touching edges
/// count as an intersection. A target with zero area that touches the root
/// is fully visible.
///
/// ```
/// use kurbo::Rect;
/// use unveil_viewport::intersection_ratio;
///
/// let root = Rect::new(0.0, 0.0, 100.0, 100.0);
/// assert_eq!(intersection_ratio(Rect::new(50.0, 0.0, 150.0, 100.0), root), Some(0.5));
/// assert_eq!(intersection_ratio(Rect::new(100.0, 0.0, 200.0, 100.0), root), Some(0.0));
/// assert_eq!(intersection_ratio(Rect::new(101.0, 0.0, 200.0, 100.0), root), None);
/// ```
#[must_use]
pub fn intersection_ratio(target: Rect, root: Rect) -> Option<f64> {
    let target = target.abs();
    let root = root.abs();
    let x0 = target.x0.max(root.x0);
    let y0 = target.y0.max(root.y0);
    let x1 = target.x1.min(root.x1);
    let y1 = target.y1.min(root.y1);
    if x0 > x1 || y0 > y1 {
        return None;
    }
    let area = target.area();
    if area <= 0.0 {
        return Some(1.0);
    }
    Some(((x1 - x0) * (y1 - y0) / area).clamp(0.0, 1.0))
}

fn crosses(threshold: f64, ratio: Option<f64>) -> bool {
    match ratio {
        None => false,
        Some(_) if threshold == 0.0 => true,
        Some(ratio) => ratio >= threshold,
    }
}

/// Tracks targets against a viewport rectangle and reports threshold crossings.
#[derive(Clone, Debug)]
pub struct IntersectionWatcher<T> {
    registry: Registry<T>,
    viewport: Rect,
    root_margin: f64,
    rects: HashMap<SubscriptionHandle, Rect>,
}

impl<T: Clone + Eq + Hash> IntersectionWatcher<T> {
    /// Creates a watcher over the given viewport rectangle.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            registry: Registry::default(),
            viewport,
            root_margin: 0.0,
            rects: HashMap::new(),
        }
    }

    /// Sets the root margin, returning the watcher.
    ///
    /// See [`set_root_margin`](Self::set_root_margin).
    #[must_use]
    pub fn with_root_margin(mut self, margin: f64) -> Self {
        self.root_margin = margin;
        self
    }

    /// Current viewport rectangle.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Current root margin.
    #[must_use]
    pub fn root_margin(&self) -> f64 {
        self.root_margin
    }

    /// The rectangle targets are intersected with: the viewport grown by the
    /// root margin on every side.
    #[must_use]
    pub fn root(&self) -> Rect {
        self.viewport.abs().inflate(self.root_margin, self.root_margin)
    }

    /// Moves or resizes the viewport at host time `at_ms` and re-evaluates
    /// every target with known geometry.
    pub fn set_viewport(&mut self, viewport: Rect, at_ms: u64) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.refresh(at_ms);
    }

    /// Grows (or, if negative, shrinks) the root on every side and re-evaluates targets.
    ///
    /// A positive margin triggers targets slightly before they scroll on screen.
    pub fn set_root_margin(&mut self, margin: f64, at_ms: u64) {
        if self.root_margin == margin {
            return;
        }
        self.root_margin = margin;
        self.refresh(at_ms);
    }

    /// Records the layout rectangle of an observed target at host time
    /// `at_ms` and re-evaluates it.
    ///
    /// Returns `false` if the target is not observed.
    pub fn set_target_rect<Q>(&mut self, target: &Q, rect: Rect, at_ms: u64) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(handle) = self.registry.handle_of(target) else {
            return false;
        };
        self.rects.insert(handle, rect);
        let ratio = intersection_ratio(rect, self.root());
        self.registry
            .record(handle, ratio.unwrap_or(0.0), at_ms, |threshold| {
                crosses(threshold, ratio)
            });
        true
    }

    /// Records a visible fraction computed by the platform.
    ///
    /// Use this when the host already has intersection entries (for example
    /// from a browser `IntersectionObserver`) instead of raw rectangles;
    /// `at_ms` plays the role of the entry's `time`. The ratio is clamped to
    /// `[0, 1]`; NaN counts as `0`. Returns `false` if the target is not
    /// observed.
    pub fn report_ratio<Q>(&mut self, target: &Q, ratio: f64, at_ms: u64) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(handle) = self.registry.handle_of(target) else {
            return false;
        };
        self.rects.remove(&handle);
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        let measured = (ratio > 0.0).then_some(ratio);
        self.registry
            .record(handle, ratio, at_ms, |threshold| crosses(threshold, measured));
        true
    }

    /// Last measured ratio of an observed target.
    #[must_use]
    pub fn ratio_of<Q>(&self, target: &Q) -> Option<f64>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.registry.handle_of(target)?;
        self.registry.get(handle).map(|o| o.ratio)
    }

    /// Whether an observed target is currently past its threshold.
    #[must_use]
    pub fn is_visible<Q>(&self, target: &Q) -> Option<bool>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.registry.handle_of(target)?;
        self.registry.get(handle).map(|o| o.visible)
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

    fn refresh(&mut self, at_ms: u64) {
        let root = self.root();
        for handle in self.registry.handles() {
            let Some(&rect) = self.rects.get(&handle) else {
                continue;
            };
            let ratio = intersection_ratio(rect, root);
            self.registry
                .record(handle, ratio.unwrap_or(0.0), at_ms, |threshold| {
                    crosses(threshold, ratio)
                });
        }
    }
}

impl<T: Clone + Eq + Hash> ViewportWatcher<T> for IntersectionWatcher<T> {
    fn observe(
        &mut self,
        target: T,
        threshold: f64,
    ) -> Result<SubscriptionHandle, ObserveError<T>> {
        self.registry.observe(target, threshold)
    }

    fn unobserve(&mut self, handle: SubscriptionHandle) -> bool {
        self.rects.remove(&handle);
        self.registry.unobserve(handle)
    }

    fn drain_events(&mut self, out: &mut Vec<VisibilityEvent<T>>) {
        self.registry.drain_into(out);
    }
}
