// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use unveil_reveal::{RevealController, Section};
use unveil_timing::{Clock, ManualClock};
use unveil_viewport::IntersectionWatcher;

const WIDTH: f64 = 1280.0;
const HEIGHT: f64 = 720.0;
const SECTION_HEIGHT: f64 = 600.0;

type Page = RevealController<IntersectionWatcher<String>, ManualClock>;

/// A long page of `n` stacked sections, each laid out and hidden below the fold.
fn build_page(n: usize) -> (Page, ManualClock) {
    let clock = ManualClock::new();
    let watcher = IntersectionWatcher::new(Rect::new(0.0, 0.0, WIDTH, HEIGHT));
    let mut page = RevealController::new(watcher, clock.clone());
    for i in 0..n {
        let id = format!("section-{i}");
        page.register_section(
            Section::new(id.as_str())
                .step("header", 100)
                .step("intro", 300)
                .step("body", 600)
                .step("cta", 900),
        )
        .unwrap();
        let top = HEIGHT + i as f64 * SECTION_HEIGHT;
        let rect = Rect::new(0.0, top, WIDTH, top + SECTION_HEIGHT);
        page.watcher_mut().set_target_rect(id.as_str(), rect, 0);
    }
    page.advance();
    (page, clock)
}

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal_register");
    for &n in &[10_usize, 100, 1_000] {
        group.bench_function(format!("sections_{n}"), |b| {
            b.iter(|| black_box(build_page(n).0.len()));
        });
    }
    group.finish();
}

fn bench_scroll_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("reveal_scroll_through");
    for &n in &[10_usize, 100, 1_000] {
        group.bench_function(format!("sections_{n}"), |b| {
            b.iter_batched(
                || build_page(n),
                |(mut page, clock)| {
                    let bottom = HEIGHT + n as f64 * SECTION_HEIGHT;
                    let mut scroll_y = 0.0;
                    let mut flips = 0;
                    while scroll_y < bottom {
                        scroll_y += 120.0;
                        clock.advance(16);
                        let viewport = Rect::new(0.0, scroll_y, WIDTH, scroll_y + HEIGHT);
                        page.watcher_mut().set_viewport(viewport, clock.now_ms());
                        flips += page.advance();
                    }
                    clock.advance(1_000);
                    flips += page.advance();
                    black_box(flips)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_unmount(c: &mut Criterion) {
    c.bench_function("reveal_unregister_mid_stagger_1000", |b| {
        b.iter_batched(
            || {
                let (mut page, clock) = build_page(1_000);
                for i in 0..1_000 {
                    black_box(page.reveal_now(&format!("section-{i}")).ok());
                }
                clock.advance(150);
                page.advance();
                page
            },
            |mut page| {
                for i in 0..1_000 {
                    black_box(page.unregister_section(&format!("section-{i}")));
                }
                black_box(page.next_deadline())
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_register, bench_scroll_through, bench_unmount);
criterion_main!(benches);
