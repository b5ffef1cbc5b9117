// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unveil Reveal: one-shot, staggered reveal-on-view for page sections.
//!
//! A view registers each of its sections with a list of named steps (heading,
//! subtitle, cards, call to action) and a delay for each. When a section first
//! becomes visible, the [`RevealController`] starts its stagger: every step's
//! flag flips from `false` to `true` once its delay has elapsed. The view reads
//! the flags to pick "hidden" or "shown" styles and may subscribe to flips with
//! [`RevealController::on_change`].
//!
//! The controller is headless. It is built from two injected parts:
//!
//! - a [`ViewportWatcher`](unveil_viewport::ViewportWatcher), which reports
//!   threshold crossings (see `unveil_viewport`),
//! - a [`Clock`](unveil_timing::Clock), which supplies the current time (see
//!   `unveil_timing`).
//!
//! The host calls [`RevealController::advance`] once per event-loop turn and,
//! if it wants to sleep, wakes up again at [`RevealController::next_deadline`].
//!
//! ## End-to-end example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Rect;
//! use unveil_reveal::{RevealController, Section};
//! use unveil_timing::{Clock, ManualClock};
//! use unveil_viewport::IntersectionWatcher;
//!
//! let clock = ManualClock::new();
//! let watcher = IntersectionWatcher::new(Rect::new(0.0, 0.0, 1280.0, 720.0));
//! let mut reveal = RevealController::new(watcher, clock.clone());
//!
//! reveal
//!     .register_section(
//!         Section::new("hero")
//!             .step("title", 100)
//!             .step("subtitle", 300)
//!             .step("cta", 600),
//!     )
//!     .unwrap();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&log);
//! reveal.on_change(move |section, key, revealed| {
//!     sink.borrow_mut().push(format!("{section}.{key}={revealed}"));
//! });
//!
//! // Layout places the hero at the top of the page, so it is on screen.
//! reveal
//!     .watcher_mut()
//!     .set_target_rect("hero", Rect::new(0.0, 0.0, 1280.0, 640.0), 0);
//! reveal.advance();
//!
//! // The host wakes up at each deadline.
//! while let Some(deadline) = reveal.next_deadline() {
//!     clock.set(deadline);
//!     reveal.advance();
//! }
//!
//! assert_eq!(
//!     *log.borrow(),
//!     ["hero.title=true", "hero.subtitle=true", "hero.cta=true"]
//! );
//! assert_eq!(clock.now_ms(), 600);
//! ```
//!
//! ## Features
//!
//! - `std` (default): wall-clock time, and listener panics are caught and logged
//!   instead of unwinding through the controller.
//! - `libm`: floating point support for `no_std` targets.
//! - `serde`: `Serialize`/`Deserialize` for [`Section`], [`Step`],
//!   [`RevealConfig`], and [`SectionOptions`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod config;
mod controller;
mod error;
mod listener;
mod section;

pub use config::{DEFAULT_THRESHOLD, RevealConfig, SectionOptions};
pub use controller::RevealController;
pub use error::{InvalidArgument, RevealError};
pub use listener::ListenerHandle;
pub use section::{Section, SectionPhase, Step};
