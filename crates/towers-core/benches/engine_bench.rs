//! # Engine Benchmarks
//!
//! Performance benchmarks for towers-core.
//!
//! Run with: `cargo bench -p towers-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use towers_core::{
    HintBoundsProcess, ImplicationKind, ImplicationsTracker, Line, OnlyChoiceProcess, Puzzle,
    PuzzleScheduler, PuzzleSeed, Triple,
};

/// A chain of `length` implications through a 16 x 16 grid.
fn create_chain(length: usize) -> ImplicationsTracker {
    let mut tracker = ImplicationsTracker::new();
    let node = |i: usize| Triple::new(i / 16 % 16, i % 16, i / 256 % 16);
    for i in 0..length {
        tracker.add(ImplicationKind::OnToOn, node(i), node(i + 1));
    }
    tracker
}

/// An N x N puzzle with every hint at 2.
fn create_hinted_puzzle(size: usize) -> Puzzle {
    let mut seed = PuzzleSeed::blank(size);
    seed.hints.top = vec![Some(2); size];
    seed.hints.left = vec![Some(2); size];
    Puzzle::from_seed(seed).expect("seed")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_implication_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("implication_closure");

    for length in [10, 100, 1000].iter() {
        let tracker = create_chain(*length);
        let start = Triple::new(0, 0, 0);
        group.bench_with_input(BenchmarkId::from_parameter(length), length, |b, _| {
            b.iter(|| black_box(tracker.implications_from_node_set(black_box(start))));
        });
    }

    group.finish();
}

fn bench_scheduler_pulses(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_until_idle");

    for size in [4, 8, 12].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut puzzle = create_hinted_puzzle(size);
                let mut cpu = PuzzleScheduler::with_capacity(4, 3000);
                cpu.add_process(Box::new(HintBoundsProcess::new()), 10, None);
                for row in 0..size {
                    for val in 0..size {
                        cpu.add_process(Box::new(OnlyChoiceProcess::new(Line::Row(row), val)), 0, None);
                    }
                }
                while !cpu.is_idle() {
                    cpu.pulse(&mut puzzle);
                }
                black_box(puzzle.history_len())
            });
        });
    }

    group.finish();
}

fn bench_undo(c: &mut Criterion) {
    c.bench_function("set_then_restart_8x8", |b| {
        b.iter(|| {
            let mut puzzle = Puzzle::blank(8).expect("puzzle");
            for row in 0..8 {
                puzzle.set_cell(row, (row * 3) % 8, row).expect("in grid");
            }
            puzzle.restart();
            black_box(puzzle.history_len())
        });
    });
}

criterion_group!(
    benches,
    bench_implication_closure,
    bench_scheduler_pulses,
    bench_undo
);
criterion_main!(benches);
