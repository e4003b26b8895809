//! Row and column elimination for a solved cell.

use super::Outcome;
use crate::primitives::REMOVE_FROM_LINE_RAM;
use crate::puzzle::{ContradictionKind, Puzzle};
use crate::scheduler::{Beat, Process};
use crate::types::{Line, ProcessId, Triple};

/// Strips a solved value from every other cell of its row or column,
/// one peer per two ticks.
///
/// A peer already narrowed to that same value raises a `Row`/`Column`
/// contradiction and ends the walk.
#[derive(Debug, Clone)]
pub struct RemoveFromLineProcess {
    id: ProcessId,
    line: Line,
    solved: Triple,
    cursor: usize,
    beat: Beat,
    removed: usize,
}

impl RemoveFromLineProcess {
    fn new(line: Line, solved: Triple) -> Self {
        let id = ProcessId::new(format!(
            "remove-from-{}:{},{},{}",
            line.name(),
            solved.row,
            solved.col,
            solved.val
        ));
        Self {
            id,
            line,
            solved,
            cursor: 0,
            beat: Beat::default(),
            removed: 0,
        }
    }

    /// Eliminate along the row of `solved`.
    #[must_use]
    pub fn row(solved: Triple) -> Self {
        Self::new(Line::Row(solved.row), solved)
    }

    /// Eliminate along the column of `solved`.
    #[must_use]
    pub fn column(solved: Triple) -> Self {
        Self::new(Line::Column(solved.col), solved)
    }

    fn clash(&self, peer: (usize, usize)) -> ContradictionKind {
        let val = self.solved.val;
        match self.line {
            Line::Row(row) => ContradictionKind::Row {
                row,
                cols: vec![self.solved.col, peer.1],
                val,
            },
            Line::Column(col) => ContradictionKind::Column {
                col,
                rows: vec![self.solved.row, peer.0],
                val,
            },
        }
    }
}

impl Process<Puzzle> for RemoveFromLineProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        REMOVE_FROM_LINE_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        let size = puzzle.size();
        match self.beat.advance() {
            Beat::Inspect => {
                if puzzle.solved_value(self.solved.row, self.solved.col) != Some(self.solved.val) {
                    return true;
                }
                if self.line.at(self.cursor) == self.solved.cell() {
                    self.cursor = self.cursor.saturating_add(1);
                }
                self.cursor >= size
            }
            Beat::Apply => {
                let peer = self.line.at(self.cursor);
                self.cursor = self.cursor.saturating_add(1);

                if puzzle.solved_value(peer.0, peer.1) == Some(self.solved.val) {
                    let clash = self.clash(peer);
                    puzzle.raise_contradiction(clash);
                    return true;
                }
                if puzzle.remove_from_cell(peer.0, peer.1, self.solved.val) {
                    self.removed = self.removed.saturating_add(1);
                }
                false
            }
        }
    }

    fn return_value(&self) -> Outcome {
        Outcome::Eliminated {
            removed: self.removed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(process: &mut RemoveFromLineProcess, puzzle: &mut Puzzle) -> usize {
        let mut ticks = 0;
        while !process.tick(puzzle) {
            ticks += 1;
            assert!(ticks < 1000, "process never finished");
        }
        ticks
    }

    #[test]
    fn row_elimination_clears_peers() {
        let mut puzzle = Puzzle::blank(4).expect("puzzle");
        puzzle.set_cell(0, 0, 2).expect("in grid");

        let mut process = RemoveFromLineProcess::row(Triple::new(0, 0, 2));
        run(&mut process, &mut puzzle);

        for col in 1..4 {
            assert!(!puzzle.marks_cell(0, col).contains(&2));
        }
        assert!(puzzle.marks_cell(1, 0).contains(&2));
        assert_eq!(process.return_value(), Outcome::Eliminated { removed: 3 });
    }

    #[test]
    fn column_elimination_makes_one_change_per_two_ticks() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.set_cell(1, 2, 0).expect("in grid");
        let start = puzzle.history_len();

        let mut process = RemoveFromLineProcess::column(Triple::new(1, 2, 0));
        assert!(!process.tick(&mut puzzle));
        assert_eq!(puzzle.history_len(), start);
        assert!(!process.tick(&mut puzzle));
        assert_eq!(puzzle.history_len(), start + 1);
        assert!(!puzzle.marks_cell(0, 2).contains(&0));
    }

    #[test]
    fn solved_peer_raises_row_contradiction() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.set_cell(0, 0, 1).expect("in grid");
        puzzle.set_cell(0, 2, 1).expect("in grid");

        let mut process = RemoveFromLineProcess::row(Triple::new(0, 0, 1));
        run(&mut process, &mut puzzle);

        let contradiction = puzzle.contradiction().expect("contradiction");
        assert_eq!(
            contradiction.kind,
            ContradictionKind::Row {
                row: 0,
                cols: vec![0, 2],
                val: 1
            }
        );
    }

    #[test]
    fn solved_peer_raises_column_contradiction() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.set_cell(2, 1, 0).expect("in grid");
        puzzle.set_cell(0, 1, 0).expect("in grid");

        let mut process = RemoveFromLineProcess::column(Triple::new(2, 1, 0));
        run(&mut process, &mut puzzle);

        let contradiction = puzzle.contradiction().expect("contradiction");
        assert_eq!(
            contradiction.kind,
            ContradictionKind::Column {
                col: 1,
                rows: vec![2, 0],
                val: 0
            }
        );
        assert!(puzzle.marks_cell(1, 1).contains(&0));
        assert_eq!(process.return_value(), Outcome::Eliminated { removed: 0 });
    }

    #[test]
    fn stops_when_source_is_no_longer_solved() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        let mut process = RemoveFromLineProcess::row(Triple::new(0, 0, 1));
        assert!(process.tick(&mut puzzle));
        assert_eq!(puzzle.history_len(), 0);
    }

    #[test]
    fn ids_encode_line_and_triple() {
        let process = RemoveFromLineProcess::column(Triple::new(1, 2, 3));
        assert_eq!(process.process_id().as_str(), "remove-from-column:1,2,3");
    }
}
