//! Binary implications from units with exactly two candidates.

use super::Outcome;
use crate::primitives::PAIR_IMPLICATIONS_RAM;
use crate::puzzle::{ImplicationKind, Puzzle};
use crate::scheduler::{Beat, Process};
use crate::types::{ProcessId, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A group of triples of which exactly one must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    /// Where `val` goes in `row`.
    Row { row: usize, val: usize },
    /// Where `val` goes in `col`.
    Column { col: usize, val: usize },
    /// Which value goes in `(row, col)`.
    Cell { row: usize, col: usize },
}

impl Unit {
    /// Triples of the unit still possible in `puzzle`.
    #[must_use]
    pub fn candidates(self, puzzle: &Puzzle) -> Vec<Triple> {
        let triples = puzzle.triples();
        match self {
            Unit::Row { row, val } => triples
                .row_val(row, val)
                .into_iter()
                .map(|col| Triple::new(row, col, val))
                .collect(),
            Unit::Column { col, val } => triples
                .col_val(col, val)
                .into_iter()
                .map(|row| Triple::new(row, col, val))
                .collect(),
            Unit::Cell { row, col } => triples
                .row_col(row, col)
                .into_iter()
                .map(|val| Triple::new(row, col, val))
                .collect(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Row { row, val } => write!(f, "row:{}:{}", row, val),
            Unit::Column { col, val } => write!(f, "column:{}:{}", col, val),
            Unit::Cell { row, col } => write!(f, "cell:{},{}", row, col),
        }
    }
}

/// For a unit with exactly two candidates `a` and `b`, records
/// `!a => b` and `a => !b` (each with its contrapositive), one per apply
/// beat. Implications go through the puzzle and are undoable.
#[derive(Debug, Clone)]
pub struct PairImplicationsProcess {
    id: ProcessId,
    unit: Unit,
    beat: Beat,
    next: Option<(ImplicationKind, Triple, Triple)>,
    added: usize,
}

impl PairImplicationsProcess {
    #[must_use]
    pub fn new(unit: Unit) -> Self {
        Self {
            id: ProcessId::new(format!("pairs:{}", unit)),
            unit,
            beat: Beat::default(),
            next: None,
            added: 0,
        }
    }

    fn missing(&self, puzzle: &Puzzle) -> Option<(ImplicationKind, Triple, Triple)> {
        let &[a, b] = self.unit.candidates(puzzle).as_slice() else {
            return None;
        };
        [ImplicationKind::OffToOn, ImplicationKind::OnToOff]
            .into_iter()
            .map(|kind| (kind, a, b))
            .find(|&(kind, from, to)| !puzzle.implications().contains(kind, from, to))
    }
}

impl Process<Puzzle> for PairImplicationsProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        PAIR_IMPLICATIONS_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        match self.beat.advance() {
            Beat::Inspect => {
                self.next = self.missing(puzzle);
                self.next.is_none()
            }
            Beat::Apply => {
                let Some((kind, from, to)) = self.next.take() else {
                    return true;
                };
                if puzzle.add_implication(kind, from, to) {
                    self.added = self.added.saturating_add(1);
                }
                false
            }
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::Implications { added: self.added }
    }
}
