// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use unveil_timing::{StaggerScheduler, StaggerStep, TimerQueue};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

/// `sections` sequences of five steps each, started at scattered times.
fn build_scheduler(sections: u32, seed: u64) -> StaggerScheduler<u32> {
    let mut rng = Lcg::new(seed);
    let mut stagger = StaggerScheduler::new();
    for _ in 0..sections {
        let start = u64::from(rng.next_u32() % 10_000);
        stagger.schedule(
            start,
            [100, 300, 600, 900, 1_200]
                .into_iter()
                .enumerate()
                .map(|(i, delay)| StaggerStep::new(i as u32, delay)),
        );
    }
    stagger
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("stagger_schedule");
    for &n in &[100_u32, 1_000, 10_000] {
        group.bench_function(format!("sections_{n}"), |b| {
            b.iter(|| black_box(build_scheduler(n, 7)));
        });
    }
    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("stagger_drain");
    for &n in &[100_u32, 1_000, 10_000] {
        group.bench_function(format!("sections_{n}"), |b| {
            b.iter_batched(
                || build_scheduler(n, 7),
                |mut stagger| {
                    let mut fired = 0_u64;
                    // Coarse 16ms host turns.
                    let mut now = 0;
                    while let Some(next) = stagger.next_deadline() {
                        now = next.max(now + 16);
                        stagger.advance_to(now, |_, key| fired += u64::from(*key));
                    }
                    black_box(fired)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_cancel(c: &mut Criterion) {
    c.bench_function("timer_queue_cancel_half", |b| {
        b.iter_batched(
            || {
                let mut rng = Lcg::new(11);
                let mut queue = TimerQueue::new();
                let ids: Vec<_> = (0..10_000_u32)
                    .map(|i| queue.schedule(u64::from(rng.next_u32() % 5_000), i))
                    .collect();
                (queue, ids)
            },
            |(mut queue, ids)| {
                for id in ids.iter().step_by(2) {
                    black_box(queue.cancel(*id));
                }
                black_box(queue.len())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_schedule, bench_drain, bench_cancel);
criterion_main!(benches);
