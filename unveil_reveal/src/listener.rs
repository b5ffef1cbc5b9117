// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change listeners.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Handle returned by [`RevealController::on_change`](crate::RevealController::on_change).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

type Callback = Box<dyn FnMut(&str, &str, bool)>;

#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(ListenerHandle, Callback)>,
    next_handle: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Listeners {
    pub(crate) fn add(&mut self, callback: Callback) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push((handle, callback));
        handle
    }

    pub(crate) fn remove(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Calls every listener in subscription order.
    pub(crate) fn notify(&mut self, section: &str, key: &str, revealed: bool) {
        for (handle, callback) in &mut self.entries {
            if !invoke(callback, section, key, revealed) {
                log::error!(
                    "reveal listener {handle:?} panicked handling {section:?}/{key:?}; continuing"
                );
            }
        }
    }
}

/// Runs one listener, returning `false` if it panicked.
#[cfg(feature = "std")]
fn invoke(callback: &mut Callback, section: &str, key: &str, revealed: bool) -> bool {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    catch_unwind(AssertUnwindSafe(|| callback(section, key, revealed))).is_ok()
}

#[cfg(not(feature = "std"))]
fn invoke(callback: &mut Callback, section: &str, key: &str, revealed: bool) -> bool {
    callback(section, key, revealed);
    true
}
