//! Whole-grid validation, narrated step by step.

use super::Outcome;
use crate::primitives::VALIDATION_RAM;
use crate::puzzle::Puzzle;
use crate::scheduler::{Beat, Process};
use crate::types::{Direction, ProcessId, Triple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    New,
    Row,
    Column,
    Hints,
    Done,
}

/// Position of the next pairwise comparison: line, then the pair `a < b`.
#[derive(Debug, Clone, Copy)]
struct PairCursor {
    line: usize,
    a: usize,
    b: usize,
}

impl PairCursor {
    const START: Self = Self { line: 0, a: 0, b: 1 };

    fn in_range(self, size: usize) -> bool {
        self.line < size && self.b < size
    }

    fn advance(&mut self, size: usize) {
        self.b = self.b.saturating_add(1);
        if self.b >= size {
            self.a = self.a.saturating_add(1);
            self.b = self.a.saturating_add(1);
        }
        if self.b >= size {
            self.line = self.line.saturating_add(1);
            self.a = 0;
            self.b = 1;
        }
    }
}

/// Walk of one view hint: cells looked at so far, the tallest tower met,
/// and how many towers were visible.
#[derive(Debug, Clone, Copy, Default)]
struct HintWalk {
    position: usize,
    tallest: Option<usize>,
    seen: usize,
}

/// Checks a fully solved grid: no duplicate in any row, none in any
/// column, and every view hint matches the visible tower count.
///
/// One pairwise comparison (or one hint cell) per two ticks; every
/// comparison is narrated into the log. Fails as soon as one check fails.
#[derive(Debug, Clone)]
pub struct ValidationProcess {
    id: ProcessId,
    phase: Phase,
    beat: Beat,
    pairs: PairCursor,
    hints: Vec<(Direction, usize, usize)>,
    hint_cursor: usize,
    walk: HintWalk,
    valid: Option<bool>,
    log: Vec<String>,
}

impl Default for ValidationProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationProcess {
    /// A validation run that has not looked at the grid yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ProcessId::new("validation"),
            phase: Phase::New,
            beat: Beat::default(),
            pairs: PairCursor::START,
            hints: Vec::new(),
            hint_cursor: 0,
            walk: HintWalk::default(),
            valid: None,
            log: Vec::new(),
        }
    }

    /// The narration so far.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    fn fail(&mut self, message: String) -> bool {
        self.log.push(message);
        self.valid = Some(false);
        self.phase = Phase::Done;
        true
    }

    fn first_unsolved(puzzle: &Puzzle) -> Option<(usize, usize)> {
        let size = puzzle.size();
        (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .find(|&(row, col)| puzzle.solved_value(row, col).is_none())
    }

    /// Compare the current pair of the current line.
    fn compare(&mut self, puzzle: &Puzzle) -> bool {
        let PairCursor { line, a, b } = self.pairs;
        let (first, second, label) = match self.phase {
            Phase::Row => ((line, a), (line, b), "row"),
            _ => ((a, line), (b, line), "column"),
        };
        let (Some(x), Some(y)) = (
            puzzle.solved_value(first.0, first.1),
            puzzle.solved_value(second.0, second.1),
        ) else {
            return self.fail(format!("{} {}: grid changed during validation", label, line));
        };

        let left = Triple::new(first.0, first.1, x);
        let right = Triple::new(second.0, second.1, y);
        if x == y {
            return self.fail(format!("{} {}: {} vs {} duplicate", label, line, left, right));
        }
        self.log
            .push(format!("{} {}: {} vs {} ok", label, line, left, right));
        false
    }

    /// Look at one more cell of the current hint line.
    fn walk_hint(&mut self, puzzle: &Puzzle) -> bool {
        let Some(&(direction, index, _)) = self.hints.get(self.hint_cursor) else {
            self.log.push("all checks passed".to_string());
            self.valid = Some(true);
            self.phase = Phase::Done;
            return true;
        };
        let cells = puzzle.line_cells(direction, index);
        let Some(&(row, col)) = cells.get(self.walk.position) else {
            return false;
        };
        let Some(val) = puzzle.solved_value(row, col) else {
            return self.fail(format!("{} hint {}: grid changed during validation", direction, index));
        };
        if self.walk.tallest.is_none_or(|tallest| val > tallest) {
            self.walk.tallest = Some(val);
            self.walk.seen = self.walk.seen.saturating_add(1);
        }
        false
    }

    /// Move to the next hint cell, settling the hint once its line ends.
    fn finish_hint_cell(&mut self, size: usize) -> bool {
        let Some(&(direction, index, expected)) = self.hints.get(self.hint_cursor) else {
            return false;
        };
        self.walk.position = self.walk.position.saturating_add(1);
        if self.walk.position < size {
            return false;
        }

        let seen = self.walk.seen;
        self.walk = HintWalk::default();
        self.hint_cursor = self.hint_cursor.saturating_add(1);
        if seen != expected {
            return self.fail(format!(
                "{} hint {}: expects {}, sees {} mismatch",
                direction, index, expected, seen
            ));
        }
        self.log.push(format!(
            "{} hint {}: expects {}, sees {} ok",
            direction, index, expected, seen
        ));
        false
    }
}

impl Process<Puzzle> for ValidationProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        VALIDATION_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        let size = puzzle.size();
        let beat = self.beat.advance();
        match (self.phase, beat) {
            (Phase::Done, _) => true,
            (Phase::New, Beat::Inspect) => match Self::first_unsolved(puzzle) {
                Some((row, col)) => self.fail(format!("cell ({}, {}) is not solved", row, col)),
                None => false,
            },
            (Phase::New, Beat::Apply) => {
                self.log.push(format!("checking {}x{} grid", size, size));
                self.phase = Phase::Row;
                self.pairs = PairCursor::START;
                false
            }
            (Phase::Row | Phase::Column, Beat::Inspect) => {
                self.pairs.in_range(size) && self.compare(puzzle)
            }
            (Phase::Row | Phase::Column, Beat::Apply) => {
                self.pairs.advance(size);
                if !self.pairs.in_range(size) {
                    self.pairs = PairCursor::START;
                    if self.phase == Phase::Row {
                        self.phase = Phase::Column;
                    } else {
                        self.phase = Phase::Hints;
                        self.hints = puzzle.hints().iter().collect();
                    }
                }
                false
            }
            (Phase::Hints, Beat::Inspect) => self.walk_hint(puzzle),
            (Phase::Hints, Beat::Apply) => self.finish_hint_cell(size),
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::Validation {
            valid: self.valid == Some(true),
            log: self.log.clone(),
        }
    }
}
