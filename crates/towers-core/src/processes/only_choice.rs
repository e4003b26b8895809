//! Only-choice scan: a value with exactly one possible cell in a line.

use super::Outcome;
use crate::primitives::ONLY_CHOICE_RAM;
use crate::puzzle::Puzzle;
use crate::scheduler::{Beat, Process};
use crate::types::{Line, ProcessId, Triple};

/// Counts, one cell per two ticks, the cells of a line that can still hold
/// `val`. When the scan ends with a single candidate that is not solved
/// yet, the candidate is assigned.
///
/// Zero candidates is reported through the outcome and left for the caller
/// to act on. Contradictions raised elsewhere do not stop the scan.
#[derive(Debug, Clone)]
pub struct OnlyChoiceProcess {
    id: ProcessId,
    line: Line,
    val: usize,
    cursor: usize,
    beat: Beat,
    candidates: Vec<(usize, usize)>,
    assigned: Option<Triple>,
}

impl OnlyChoiceProcess {
    /// Scan `line` for the cells that can hold `val`.
    #[must_use]
    pub fn new(line: Line, val: usize) -> Self {
        Self {
            id: ProcessId::new(format!("only-choice:{}:{}:{}", line.name(), line.index(), val)),
            line,
            val,
            cursor: 0,
            beat: Beat::default(),
            candidates: Vec::new(),
            assigned: None,
        }
    }
}

impl Process<Puzzle> for OnlyChoiceProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        ONLY_CHOICE_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        let size = puzzle.size();
        match self.beat.advance() {
            Beat::Inspect => {
                if self.cursor >= size {
                    return true;
                }
                let (row, col) = self.line.at(self.cursor);
                if puzzle.is_possible(Triple::new(row, col, self.val)) {
                    self.candidates.push((row, col));
                }
                false
            }
            Beat::Apply => {
                self.cursor = self.cursor.saturating_add(1);
                if self.cursor < size {
                    return false;
                }
                if let &[(row, col)] = self.candidates.as_slice()
                    && puzzle.set_cell(row, col, self.val).unwrap_or(false)
                {
                    self.assigned = Some(Triple::new(row, col, self.val));
                }
                true
            }
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::OnlyChoice {
            line: self.line,
            val: self.val,
            candidates: self.candidates.len(),
            assigned: self.assigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(process: &mut OnlyChoiceProcess, puzzle: &mut Puzzle) {
        for _ in 0..1000 {
            if process.tick(puzzle) {
                return;
            }
        }
        unreachable!("process never finished");
    }

    #[test]
    fn single_candidate_is_assigned() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.remove_from_cell(0, 0, 2);
        puzzle.remove_from_cell(0, 1, 2);

        let mut process = OnlyChoiceProcess::new(Line::Row(0), 2);
        run(&mut process, &mut puzzle);

        assert_eq!(puzzle.solved_value(0, 2), Some(2));
        assert_eq!(
            process.return_value(),
            Outcome::OnlyChoice {
                line: Line::Row(0),
                val: 2,
                candidates: 1,
                assigned: Some(Triple::new(0, 2, 2))
            }
        );
    }

    #[test]
    fn already_solved_candidate_is_not_reassigned() {
        let mut puzzle = Puzzle::blank(2).expect("puzzle");
        puzzle.set_cell(0, 1, 0).expect("in grid");
        puzzle.remove_from_cell(1, 1, 0);
        let before = puzzle.history_len();

        let mut process = OnlyChoiceProcess::new(Line::Column(1), 0);
        run(&mut process, &mut puzzle);

        assert_eq!(puzzle.history_len(), before);
        assert_eq!(
            process.return_value(),
            Outcome::OnlyChoice {
                line: Line::Column(1),
                val: 0,
                candidates: 1,
                assigned: None
            }
        );
    }

    #[test]
    fn zero_candidates_is_reported_not_raised() {
        let mut puzzle = Puzzle::blank(2).expect("puzzle");
        puzzle.remove_from_cell(1, 0, 1);
        puzzle.remove_from_cell(1, 1, 1);

        let mut process = OnlyChoiceProcess::new(Line::Row(1), 1);
        run(&mut process, &mut puzzle);

        assert!(puzzle.contradiction().is_none());
        assert_eq!(
            process.return_value(),
            Outcome::OnlyChoice {
                line: Line::Row(1),
                val: 1,
                candidates: 0,
                assigned: None
            }
        );
    }

    #[test]
    fn scan_takes_two_ticks_per_cell() {
        let mut puzzle = Puzzle::blank(4).expect("puzzle");
        let mut process = OnlyChoiceProcess::new(Line::Row(2), 3);
        let mut ticks = 1;
        while !process.tick(&mut puzzle) {
            ticks += 1;
        }
        assert_eq!(ticks, 8);
    }
}
