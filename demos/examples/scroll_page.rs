// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-offset reveal on the about page, in real time.
//!
//! The about page reveals each section once the page has scrolled past a
//! fraction of the viewport height, and forces its hero on after 300ms. This
//! demo replays a short scroll script against the wall clock, sleeping until
//! the controller's next deadline between scroll events.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p unveil_demos --example scroll_page`

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use unveil_demos::PageTable;
use unveil_reveal::{RevealController, SectionPhase};
use unveil_timing::{Clock, StdClock};
use unveil_viewport::ScrollWatcher;

const VIEWPORT_HEIGHT: f64 = 900.0;

fn main() -> Result<()> {
    env_logger::init();

    let table = PageTable::bundled()?;
    let page = table.page("about").context("bundled table has no about page")?;
    let mut reveal = page.mount(ScrollWatcher::<String>::new(), StdClock::new())?;
    reveal.on_change(|section, _, _| println!("revealed {section}"));
    let start = reveal.clock().now_ms();
    reveal.watcher_mut().set_scroll(0.0, VIEWPORT_HEIGHT, start);

    // (time in ms, scroll offset in px)
    let script = [(500, 200.0), (800, 400.0), (1_100, 650.0), (1_400, 900.0)];
    for (at_ms, scroll_y) in script {
        run_until(&mut reveal, at_ms);
        log::info!("scrolled to {scroll_y}px");
        let now = reveal.clock().now_ms();
        reveal.watcher_mut().set_scroll(scroll_y, VIEWPORT_HEIGHT, now);
        reveal.advance();
    }

    let pending: Vec<_> = page
        .sections
        .iter()
        .filter(|s| reveal.phase(&s.id) == Some(SectionPhase::Registered))
        .map(|s| s.id.as_str())
        .collect();
    println!("never reached: {pending:?}");
    Ok(())
}

/// Sleeps through controller deadlines until `until_ms` on the controller clock.
fn run_until(reveal: &mut RevealController<ScrollWatcher<String>, StdClock>, until_ms: u64) {
    loop {
        let now = reveal.clock().now_ms();
        if now >= until_ms {
            return;
        }
        let wake = reveal.next_deadline().map_or(until_ms, |d| d.min(until_ms));
        thread::sleep(Duration::from_millis(wake.saturating_sub(now)));
        reveal.advance();
    }
}
