//! Random guessing, the last resort when inference stalls.

use super::Outcome;
use crate::primitives::RANDOM_GUESS_RAM;
use crate::puzzle::Puzzle;
use crate::scheduler::{Beat, Process};
use crate::types::{ProcessId, Triple};

/// Enumerates every undetermined triple, one per two ticks, then guesses
/// one of them uniformly at random.
///
/// The guess goes through [`Puzzle::take_guess`], so it pushes a guess
/// marker and can be backtracked with `mark_guess_as_impossible`.
#[derive(Debug, Clone)]
pub struct RandomGuessProcess {
    id: ProcessId,
    beat: Beat,
    cursor: usize,
    candidates: Vec<Triple>,
    guessed: Option<Triple>,
}

impl Default for RandomGuessProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomGuessProcess {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ProcessId::new("random-guess"),
            beat: Beat::default(),
            cursor: 0,
            candidates: Vec::new(),
            guessed: None,
        }
    }

    /// The triple at flat index `cursor` in row, column, value order.
    fn triple_at(cursor: usize, size: usize) -> Triple {
        let val = cursor % size;
        let col = (cursor / size) % size;
        let row = cursor / size / size;
        Triple::new(row, col, val)
    }

    fn pick(&self) -> Option<Triple> {
        if self.candidates.is_empty() {
            return None;
        }
        let index = rand::random_range(0..self.candidates.len());
        self.candidates.get(index).copied()
    }
}

impl Process<Puzzle> for RandomGuessProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        RANDOM_GUESS_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        let size = puzzle.size();
        let total = size.saturating_mul(size).saturating_mul(size);
        match self.beat.advance() {
            Beat::Inspect if self.cursor < total => {
                let triple = Self::triple_at(self.cursor, size);
                if puzzle.triples().count_row_col(triple.row, triple.col) > 1
                    && puzzle.is_possible(triple)
                {
                    self.candidates.push(triple);
                }
                false
            }
            Beat::Inspect => self.candidates.is_empty(),
            Beat::Apply if self.cursor < total => {
                self.cursor = self.cursor.saturating_add(1);
                false
            }
            Beat::Apply => {
                if let Some(triple) = self.pick()
                    && puzzle.take_guess(triple).unwrap_or(false)
                {
                    self.guessed = Some(triple);
                }
                true
            }
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::Guess(self.guessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(process: &mut RandomGuessProcess, puzzle: &mut Puzzle) {
        for _ in 0..10_000 {
            if process.tick(puzzle) {
                return;
            }
        }
        unreachable!("process never finished");
    }

    #[test]
    fn guesses_an_undetermined_triple() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        for (row, col, val) in [(0, 0, 0), (0, 1, 1), (1, 0, 1), (1, 1, 0)] {
            puzzle.set_cell(row, col, val).expect("in grid");
        }
        puzzle.remove_from_cell(2, 2, 0);

        let mut process = RandomGuessProcess::new();
        run(&mut process, &mut puzzle);

        let Outcome::Guess(Some(guess)) = process.return_value() else {
            unreachable!("expected a guess");
        };
        assert!(!(guess.row < 2 && guess.col < 2));
        assert_ne!(guess, Triple::new(2, 2, 0));
        assert_eq!(puzzle.guess_depth(), 1);
        assert_eq!(puzzle.solved_value(guess.row, guess.col), Some(guess.val));
    }

    #[test]
    fn solved_grid_yields_no_guess() {
        let mut puzzle = Puzzle::blank(2).expect("puzzle");
        puzzle.set_cell(0, 0, 0).expect("in grid");
        puzzle.set_cell(0, 1, 1).expect("in grid");
        puzzle.set_cell(1, 0, 1).expect("in grid");
        puzzle.set_cell(1, 1, 0).expect("in grid");

        let mut process = RandomGuessProcess::new();
        run(&mut process, &mut puzzle);

        assert_eq!(process.return_value(), Outcome::Guess(None));
        assert_eq!(puzzle.guess_depth(), 0);
    }

    #[test]
    fn pick_reaches_every_candidate() {
        let mut process = RandomGuessProcess::new();
        process.candidates = vec![
            Triple::new(0, 0, 0),
            Triple::new(0, 0, 1),
            Triple::new(1, 2, 0),
        ];

        let mut drawn = std::collections::BTreeSet::new();
        for _ in 0..500 {
            drawn.extend(process.pick());
        }
        assert_eq!(drawn.len(), 3);
    }

    #[test]
    fn flat_index_covers_grid_in_order() {
        assert_eq!(RandomGuessProcess::triple_at(0, 3), Triple::new(0, 0, 0));
        assert_eq!(RandomGuessProcess::triple_at(4, 3), Triple::new(0, 1, 1));
        assert_eq!(RandomGuessProcess::triple_at(26, 3), Triple::new(2, 2, 2));
    }
}
