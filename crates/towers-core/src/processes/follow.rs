//! Applying the implication closure of one asserted or excluded triple.

use super::{Change, Outcome};
use crate::primitives::FOLLOW_IMPLICATIONS_RAM;
use crate::puzzle::Puzzle;
use crate::scheduler::Process;
use crate::types::{ProcessId, Triple};
use std::collections::VecDeque;
use tracing::debug;

/// Queries the implication graph once for everything forced by `start`,
/// then applies one forced change per tick.
///
/// A forced set of a triple that is already excluded clears its cell,
/// which raises `NoPossibilities`. The process stops at the first active
/// contradiction.
#[derive(Debug, Clone)]
pub struct FollowImplicationsProcess {
    id: ProcessId,
    start: Change,
    queue: Option<VecDeque<Change>>,
    changes: usize,
}

impl FollowImplicationsProcess {
    /// Follow what asserting `triple` forces.
    #[must_use]
    pub fn set(triple: Triple) -> Self {
        Self::new("follow-set", Change::Set(triple), triple)
    }

    /// Follow what excluding `triple` forces.
    #[must_use]
    pub fn removal(triple: Triple) -> Self {
        Self::new("follow-removal", Change::Exclude(triple), triple)
    }

    fn new(kind: &str, start: Change, triple: Triple) -> Self {
        Self {
            id: ProcessId::new(format!(
                "{}:{},{},{}",
                kind, triple.row, triple.col, triple.val
            )),
            start,
            queue: None,
            changes: 0,
        }
    }

    /// Forced changes, sets first, excluding the start literal itself.
    fn plan(&self, puzzle: &Puzzle) -> VecDeque<Change> {
        let implications = puzzle.implications();
        let (closure, start) = match self.start {
            Change::Set(t) => (implications.implications_from_node_set(t), t),
            Change::Exclude(t) => (implications.implications_from_node_removal(t), t),
        };
        let sets = closure
            .set
            .iter()
            .filter(|&&t| !matches!(self.start, Change::Set(s) if s == t))
            .map(|&t| Change::Set(t));
        let exclusions = closure
            .excluded
            .iter()
            .filter(|&&t| !matches!(self.start, Change::Exclude(s) if s == t))
            .map(|&t| Change::Exclude(t));
        let plan: VecDeque<Change> = sets.chain(exclusions).collect();
        debug!(start = %start, forced = plan.len(), "implication closure");
        plan
    }

    /// Whether the starting literal still holds in the puzzle.
    fn start_holds(&self, puzzle: &Puzzle) -> bool {
        match self.start {
            Change::Set(t) => puzzle.solved_value(t.row, t.col) == Some(t.val),
            Change::Exclude(t) => !puzzle.is_possible(t),
        }
    }
}

impl Process<Puzzle> for FollowImplicationsProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.id
    }

    fn ram_requirement(&self) -> u64 {
        FOLLOW_IMPLICATIONS_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        if puzzle.contradiction().is_some() {
            return true;
        }
        let Some(queue) = self.queue.as_mut() else {
            if !self.start_holds(puzzle) {
                return true;
            }
            let plan = self.plan(puzzle);
            let done = plan.is_empty();
            self.queue = Some(plan);
            return done;
        };

        while let Some(change) = queue.pop_front() {
            if !change.is_pending(puzzle) {
                continue;
            }
            if change.apply(puzzle) {
                self.changes = self.changes.saturating_add(1);
            }
            return queue.is_empty() || puzzle.contradiction().is_some();
        }
        true
    }

    fn return_value(&self) -> Outcome {
        Outcome::Followed {
            changes: self.changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::ImplicationKind;

    fn t(row: usize, col: usize, val: usize) -> Triple {
        Triple::new(row, col, val)
    }

    fn run(process: &mut FollowImplicationsProcess, puzzle: &mut Puzzle) {
        for _ in 0..1000 {
            if process.tick(puzzle) {
                return;
            }
        }
        unreachable!("process never finished");
    }

    #[test]
    fn set_follows_chain() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.add_implication(ImplicationKind::OnToOn, t(0, 0, 0), t(1, 1, 1));
        puzzle.add_implication(ImplicationKind::OnToOff, t(1, 1, 1), t(2, 2, 2));
        puzzle.set_cell(0, 0, 0).expect("in grid");

        let mut process = FollowImplicationsProcess::set(t(0, 0, 0));
        run(&mut process, &mut puzzle);

        assert_eq!(puzzle.solved_value(1, 1), Some(1));
        assert!(!puzzle.is_possible(t(2, 2, 2)));
        assert_eq!(process.return_value(), Outcome::Followed { changes: 2 });
    }

    #[test]
    fn removal_follows_contrapositive() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.add_implication(ImplicationKind::OnToOn, t(0, 0, 0), t(1, 1, 1));
        puzzle.remove_from_cell(1, 1, 1);

        let mut process = FollowImplicationsProcess::removal(t(1, 1, 1));
        run(&mut process, &mut puzzle);

        assert!(!puzzle.is_possible(t(0, 0, 0)));
    }

    #[test]
    fn forced_set_of_excluded_triple_raises() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.add_implication(ImplicationKind::OffToOn, t(0, 0, 0), t(0, 1, 0));
        puzzle.remove_from_cell(0, 1, 0);
        puzzle.remove_from_cell(0, 0, 0);

        let mut process = FollowImplicationsProcess::removal(t(0, 0, 0));
        run(&mut process, &mut puzzle);

        assert!(puzzle.marks_cell(0, 1).is_empty());
        assert!(puzzle.contradiction().is_some());
    }

    #[test]
    fn nothing_happens_when_start_no_longer_holds() {
        let mut puzzle = Puzzle::blank(3).expect("puzzle");
        puzzle.add_implication(ImplicationKind::OnToOn, t(0, 0, 0), t(1, 1, 1));

        let mut process = FollowImplicationsProcess::set(t(0, 0, 0));
        assert!(process.tick(&mut puzzle));
        assert_eq!(process.return_value(), Outcome::Followed { changes: 0 });
    }
}
