//! Shared puzzles for unit tests.

use crate::puzzle::{Hints, Puzzle, PuzzleSeed};

/// Zero-based solution of the 4x4 demo puzzle.
pub(crate) const SOLUTION_4: [[usize; 4]; 4] = [
    [1, 0, 3, 2],
    [2, 3, 0, 1],
    [3, 2, 1, 0],
    [0, 1, 2, 3],
];

fn edge(hints: [usize; 4]) -> Vec<Option<usize>> {
    hints.into_iter().map(Some).collect()
}

/// The 4x4 demo seed: every hint present, no givens.
pub(crate) fn four_by_four_seed() -> PuzzleSeed {
    PuzzleSeed {
        size: 4,
        hints: Hints {
            top: edge([3, 2, 1, 2]),
            bottom: edge([2, 3, 2, 1]),
            left: edge([2, 2, 1, 4]),
            right: edge([2, 2, 4, 1]),
        },
        givens: Vec::new(),
    }
}

/// The 4x4 demo puzzle, untouched.
pub(crate) fn four_by_four() -> Puzzle {
    Puzzle::from_seed(four_by_four_seed()).expect("demo seed is valid")
}

/// Set every cell of `puzzle` from `grid`.
pub(crate) fn fill(puzzle: &mut Puzzle, grid: &[[usize; 4]; 4]) {
    for (row, values) in grid.iter().enumerate() {
        for (col, &val) in values.iter().enumerate() {
            puzzle.set_cell(row, col, val).expect("in grid");
        }
    }
}
