// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Landing page reveal.
//!
//! Mount the "ai-solutions" page from the bundled page table, lay its section
//! out below the fold, and scroll towards it in virtual time. Every flag flip
//! prints the class a view would switch to.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p unveil_demos --example landing_page`

use anyhow::{Context, Result};
use kurbo::Rect;
use unveil_demos::{PageTable, transition_class};
use unveil_timing::{Clock, ManualClock};

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 720.0;

fn main() -> Result<()> {
    env_logger::init();

    let table = PageTable::bundled()?;
    let page = table
        .page("ai-solutions")
        .context("bundled table has no ai-solutions page")?;

    let clock = ManualClock::new();
    let viewport = Rect::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let watcher = page.intersection_watcher(viewport);
    let mut reveal = page.mount(watcher, clock.clone())?;

    let printer = clock.clone();
    reveal.on_change(move |section, key, revealed| {
        println!(
            "[{:>5}ms] {section}.{key:<10} -> {}",
            printer.now_ms(),
            transition_class(revealed)
        );
    });

    // The section sits 900px down the page and is 800px tall.
    reveal.watcher_mut().set_target_rect(
        "ai-solutions",
        Rect::new(0.0, 900.0, VIEWPORT_WIDTH, 1_700.0),
        clock.now_ms(),
    );

    // Scroll 60px every 50ms until the page bottom, then let the stagger finish.
    let mut scroll_y = 0.0;
    while scroll_y < 1_000.0 {
        clock.advance(50);
        scroll_y += 60.0;
        let viewport = Rect::new(0.0, scroll_y, VIEWPORT_WIDTH, scroll_y + VIEWPORT_HEIGHT);
        reveal.watcher_mut().set_viewport(viewport, clock.now_ms());
        reveal.advance();
    }
    while let Some(deadline) = reveal.next_deadline() {
        clock.set(deadline);
        reveal.advance();
    }

    println!("final state: {:?}", reveal.state("ai-solutions")?);
    Ok(())
}
