// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unveil Timing: host-agnostic timer primitives for reveal animations.
//!
//! This crate owns no event loop and never sleeps. Hosts (a browser event loop,
//! a winit app, a test harness) drive it by passing the current time in, and
//! ask it when it next needs to be woken. It provides:
//!
//! - [`Clock`]: the injected time source, with [`ManualClock`] for virtual time
//!   and (with the `std` feature) [`StdClock`] for wall-clock time.
//! - [`TimerQueue`]: a deadline-ordered queue of cancelable payloads.
//! - [`StaggerScheduler`]: fires a list of named steps at fixed offsets from a
//!   shared start time, the building block for cascading reveal animations.
//!
//! ## Stagger example
//!
//! ```rust
//! use unveil_timing::{StaggerScheduler, StaggerStep};
//!
//! let mut stagger = StaggerScheduler::new();
//! let handle = stagger.schedule(
//!     0,
//!     [
//!         StaggerStep::new("a", 100),
//!         StaggerStep::new("b", 50),
//!         StaggerStep::new("c", 50),
//!     ],
//! );
//!
//! let mut fired = Vec::new();
//! stagger.advance_to(100, |_, key| fired.push(*key));
//!
//! // Equal delays fire in list order, longer delays fire later.
//! assert_eq!(fired, ["b", "c", "a"]);
//! assert!(!stagger.is_active(handle));
//! ```
//!
//! ## Cancellation
//!
//! Both [`TimerQueue::cancel`] and [`StaggerScheduler::cancel`] are idempotent:
//! cancelling a handle that already fired or was already cancelled is a no-op.
//! Once a cancel call returns, nothing scheduled under that handle fires again.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod clock;
mod queue;
mod stagger;

#[cfg(feature = "std")]
pub use clock::StdClock;
pub use clock::{Clock, ManualClock};
pub use queue::{Expired, TimerId, TimerQueue};
pub use stagger::{ScheduleHandle, StaggerScheduler, StaggerStep};
