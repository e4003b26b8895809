//! Upper bounds on heights implied by view hints.

use super::{Change, Outcome};
use crate::primitives::HINT_BOUNDS_RAM;
use crate::puzzle::Puzzle;
use crate::scheduler::{Beat, Process};
use crate::types::{ProcessId, Triple};
use std::collections::VecDeque;

/// For a hint `h`, the cell at distance `i` from the edge cannot be taller
/// than `N - h + 1 + i`: every tower in front of it must leave room for
/// `h - 1` taller ones behind. A hint of 1 puts the tallest tower at the
/// edge.
///
/// Plans every bound on the first inspect beat, then applies one per
/// apply beat. Stops at the first active contradiction.
#[derive(Debug, Clone)]
pub struct HintBoundsProcess {
    id: ProcessId,
    beat: Beat,
    plan: Option<VecDeque<Change>>,
    next: Option<Change>,
    changes: usize,
}

impl Default for HintBoundsProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl HintBoundsProcess {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ProcessId::new("hint-bounds"),
            beat: Beat::default(),
            plan: None,
            next: None,
            changes: 0,
        }
    }

    fn build_plan(puzzle: &Puzzle) -> VecDeque<Change> {
        let size = puzzle.size();
        let mut plan = VecDeque::new();
        for (direction, index, hint) in puzzle.hints().iter() {
            let cells = puzzle.line_cells(direction, index);
            if hint == 1
                && let Some(&(row, col)) = cells.first()
            {
                plan.push_back(Change::Set(Triple::new(row, col, size.saturating_sub(1))));
                continue;
            }
            for (distance, &(row, col)) in cells.iter().enumerate() {
                let highest = size.saturating_sub(hint).saturating_add(distance);
                for val in highest.saturating_add(1)..size {
                    plan.push_back(Change::Exclude(Triple::new(row, col, val)));
                }
            }
        }
        plan
    }
}

impl Process<Puzzle> for HintBoundsProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        HINT_BOUNDS_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        if puzzle.contradiction().is_some() {
            return true;
        }
        match self.beat.advance() {
            Beat::Inspect => {
                let plan = self.plan.get_or_insert_with(|| Self::build_plan(&*puzzle));
                self.next = None;
                while let Some(change) = plan.pop_front() {
                    if change.is_pending(puzzle) {
                        self.next = Some(change);
                        break;
                    }
                }
                self.next.is_none()
            }
            Beat::Apply => {
                let Some(change) = self.next.take() else {
                    return true;
                };
                if change.apply(puzzle) {
                    self.changes = self.changes.saturating_add(1);
                }
                false
            }
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::HintBounds {
            changes: self.changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::four_by_four;
    use crate::types::Direction;
    use std::collections::BTreeSet;

    fn run(process: &mut HintBoundsProcess, puzzle: &mut Puzzle) {
        for _ in 0..10_000 {
            if process.tick(puzzle) {
                return;
            }
        }
        unreachable!("process never finished");
    }

    #[test]
    fn demo_bounds() {
        let mut puzzle = four_by_four();
        let mut process = HintBoundsProcess::new();
        run(&mut process, &mut puzzle);

        // Hints of 1 put the tallest tower at the edge.
        assert_eq!(puzzle.solved_value(0, 2), Some(3));
        assert_eq!(puzzle.solved_value(2, 0), Some(3));
        assert_eq!(puzzle.solved_value(3, 3), Some(3));
        // Hints of 4 put the shortest tower at the edge.
        assert_eq!(puzzle.solved_value(3, 0), Some(0));
        assert_eq!(puzzle.solved_value(2, 3), Some(0));
        assert_eq!(puzzle.marks_cell(3, 1), BTreeSet::from([0, 1]));
        assert!(puzzle.contradiction().is_none());
        assert!(process.return_value().changed_puzzle());
    }

    #[test]
    fn hint_two_caps_the_nearest_cell() {
        let mut seed = crate::puzzle::PuzzleSeed::blank(4);
        seed.hints.right[1] = Some(2);
        let mut puzzle = Puzzle::from_seed(seed).expect("seed");

        let mut process = HintBoundsProcess::new();
        run(&mut process, &mut puzzle);

        assert_eq!(puzzle.marks_cell(1, 3), BTreeSet::from([0, 1, 2]));
        assert_eq!(puzzle.marks_cell(1, 2).len(), 4);
        assert_eq!(puzzle.line_cells(Direction::Right, 1)[0], (1, 3));
    }
}
