// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unveil Viewport: visibility watchers for reveal-on-scroll UIs.
//!
//! A viewport watcher tracks registered targets and reports when each one
//! crosses its visibility threshold. Watchers are headless: the host feeds
//! them geometry (or platform-computed ratios) and drains the resulting
//! [`VisibilityEvent`]s on its next event-loop turn.
//!
//! - [`ViewportWatcher`]: the contract consumers such as a reveal controller
//!   program against.
//! - [`IntersectionWatcher`]: intersection-ratio visibility, the model of the
//!   browser `IntersectionObserver`. Hosts either push target and viewport
//!   rectangles, or push ratios the platform already computed.
//! - [`ScrollWatcher`]: scroll-offset visibility, where a target counts as
//!   visible once the page has scrolled past a fraction of the viewport height.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use unveil_viewport::{IntersectionWatcher, ViewportWatcher};
//!
//! // An 800x600 viewport at the top of the page.
//! let mut watcher = IntersectionWatcher::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let handle = watcher.observe("pricing", 0.1).unwrap();
//!
//! // The pricing section sits below the fold. Updates carry the host time.
//! watcher.set_target_rect(&"pricing", Rect::new(0.0, 900.0, 800.0, 1_300.0), 0);
//! assert!(watcher.take_events().is_empty());
//!
//! // Scroll down by 400px: a quarter of the section is now on screen.
//! watcher.set_viewport(Rect::new(0.0, 400.0, 800.0, 1_000.0), 120);
//! let events = watcher.take_events();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].handle, handle);
//! assert!(events[0].visible);
//! assert_eq!(events[0].ratio, 0.25);
//! assert_eq!(events[0].at_ms, 120);
//! ```
//!
//! ## Event semantics
//!
//! - Events are emitted only when a target crosses its threshold, in either
//!   direction. Consumers decide whether exits and re-entries matter.
//! - Events for one target are queued in the order the crossings happened.
//!   No order is promised between different targets updated in the same turn.
//! - [`ViewportWatcher::unobserve`] is idempotent and discards any events still
//!   queued for that subscription.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod intersection;
mod registry;
mod scroll;
mod watcher;

pub use intersection::{IntersectionWatcher, intersection_ratio};
pub use scroll::ScrollWatcher;
pub use watcher::{
    ObserveError, SubscriptionHandle, ViewportWatcher, VisibilityEvent, check_threshold,
};
