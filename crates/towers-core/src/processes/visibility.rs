//! Seen-or-hidden-for-sure counting against a view hint.
//!
//! Along a line read from one edge, position `p` has a *floor* (the largest
//! minimum among the cells in front of it) and a *ceiling* (the largest
//! maximum in front of it). A tower taller than the ceiling is seen for
//! sure; one shorter than the floor is hidden for sure. The tallest height
//! is always seen.
//!
//! Counting the sure positions (or heights) against the hint gives three
//! outcomes: too many of one kind is a `View` contradiction; exactly the
//! hinted number of seen means every unknown must be hidden; exactly the
//! complement hidden means every unknown must be seen. Values that cannot
//! obey the inferred side are removed, the rest get the matching mark.

use super::Outcome;
use crate::primitives::VISIBILITY_COUNT_RAM;
use crate::puzzle::{ContradictionKind, Puzzle};
use crate::scheduler::{Beat, Process};
use crate::types::{Direction, ProcessId, Triple};
use std::collections::BTreeSet;

// =============================================================================
// LINE BOUNDS
// =============================================================================

/// Snapshot of one hinted line with per-position bounds.
struct LineView {
    size: usize,
    cells: Vec<(usize, usize)>,
    marks: Vec<BTreeSet<usize>>,
    floor: Vec<Option<usize>>,
    ceiling: Vec<Option<usize>>,
}

impl LineView {
    /// Read a line; `None` if some cell has no possibility left.
    fn read(puzzle: &Puzzle, direction: Direction, index: usize) -> Option<Self> {
        let cells = puzzle.line_cells(direction, index);
        let marks: Vec<_> = cells
            .iter()
            .map(|&(row, col)| puzzle.marks_cell(row, col))
            .collect();

        let mut floor = Vec::with_capacity(marks.len());
        let mut ceiling = Vec::with_capacity(marks.len());
        let mut running: Option<(usize, usize)> = None;
        for set in &marks {
            floor.push(running.map(|(low, _)| low));
            ceiling.push(running.map(|(_, high)| high));
            let (&min, &max) = (set.first()?, set.last()?);
            running = Some(match running {
                Some((low, high)) => (low.max(min), high.max(max)),
                None => (min, max),
            });
        }

        Some(Self {
            size: puzzle.size(),
            cells,
            marks,
            floor,
            ceiling,
        })
    }

    fn triple(&self, position: usize, val: usize) -> Option<Triple> {
        self.cells
            .get(position)
            .map(|&(row, col)| Triple::new(row, col, val))
    }

    fn surely_seen(&self, position: usize, val: usize) -> bool {
        val.saturating_add(1) == self.size
            || self
                .ceiling
                .get(position)
                .copied()
                .flatten()
                .is_none_or(|ceiling| val > ceiling)
    }

    fn surely_hidden(&self, position: usize, val: usize) -> bool {
        self.floor
            .get(position)
            .copied()
            .flatten()
            .is_some_and(|floor| val < floor)
    }

    fn position_seen(&self, position: usize) -> bool {
        self.marks[position]
            .iter()
            .all(|&val| self.surely_seen(position, val))
    }

    fn position_hidden(&self, position: usize) -> bool {
        self.marks[position]
            .iter()
            .all(|&val| self.surely_hidden(position, val))
    }

    /// Positions that can still hold `val`.
    fn positions_of(&self, val: usize) -> Vec<usize> {
        (0..self.marks.len())
            .filter(|&p| self.marks[p].contains(&val))
            .collect()
    }
}

/// The single change an apply beat performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Remove(Triple),
    Mark { triple: Triple, seen: bool },
    Contradiction { seen: usize, hidden: usize },
}

/// Shared driver: direction, index, beat, and the step found by the last
/// inspect beat.
#[derive(Debug, Clone)]
struct Driver {
    id: ProcessId,
    direction: Direction,
    index: usize,
    beat: Beat,
    pending: Option<Step>,
    changes: usize,
}

impl Driver {
    fn new(kind: &str, direction: Direction, index: usize) -> Self {
        Self {
            id: ProcessId::new(format!("{}-visibility:{}:{}", kind, direction, index)),
            direction,
            index,
            beat: Beat::default(),
            pending: None,
            changes: 0,
        }
    }

    fn tick(
        &mut self,
        puzzle: &mut Puzzle,
        find: impl Fn(&Puzzle, &Self, usize) -> Option<Step>,
    ) -> bool {
        match self.beat.advance() {
            Beat::Inspect => {
                if puzzle.contradiction().is_some() {
                    return true;
                }
                let Some(hint) = puzzle.hint(self.direction, self.index) else {
                    return true;
                };
                self.pending = find(&*puzzle, self, hint);
                self.pending.is_none()
            }
            Beat::Apply => {
                let Some(step) = self.pending.take() else {
                    return true;
                };
                match step {
                    Step::Remove(t) => {
                        puzzle.remove_from_cell(t.row, t.col, t.val);
                    }
                    Step::Mark { triple, seen } => {
                        puzzle.add_visibility_info(triple, self.direction, seen);
                    }
                    Step::Contradiction { seen, hidden } => {
                        puzzle.raise_contradiction(ContradictionKind::View {
                            direction: self.direction,
                            index: self.index,
                            seen,
                            hidden,
                        });
                        return true;
                    }
                }
                self.changes = self.changes.saturating_add(1);
                false
            }
        }
    }

    /// Mark a triple seen or hidden, or remove it if the opposite mark is
    /// already recorded.
    fn mark(&self, puzzle: &Puzzle, triple: Triple, seen: bool) -> Option<Step> {
        let info = puzzle.visibility().info(triple, self.direction);
        let (already, opposite) = if seen {
            (info.seen, info.hidden)
        } else {
            (info.hidden, info.seen)
        };
        if opposite {
            Some(Step::Remove(triple))
        } else if !already {
            Some(Step::Mark { triple, seen })
        } else {
            None
        }
    }
}

// =============================================================================
// CELL VISIBILITY
// =============================================================================

/// Classifies each position of a hinted line as seen, hidden, or unknown.
///
/// Stops as soon as any contradiction is active.
#[derive(Debug, Clone)]
pub struct CellVisibilityProcess {
    driver: Driver,
}

impl CellVisibilityProcess {
    #[must_use]
    pub fn new(direction: Direction, index: usize) -> Self {
        Self {
            driver: Driver::new("cell", direction, index),
        }
    }

    fn find(puzzle: &Puzzle, driver: &Driver, hint: usize) -> Option<Step> {
        let view = LineView::read(puzzle, driver.direction, driver.index)?;
        let size = view.size;
        let seen = (0..size).filter(|&p| view.position_seen(p)).count();
        let hidden = (0..size).filter(|&p| view.position_hidden(p)).count();
        if seen > hint || hidden > size.saturating_sub(hint) {
            return Some(Step::Contradiction { seen, hidden });
        }

        for position in 0..size {
            let unknown = !view.position_seen(position) && !view.position_hidden(position);
            for &val in &view.marks[position] {
                let triple = view.triple(position, val)?;
                let sure_seen = view.surely_seen(position, val);
                let sure_hidden = view.surely_hidden(position, val);

                if unknown && seen == hint {
                    if sure_seen {
                        return Some(Step::Remove(triple));
                    }
                    if let Some(step) = driver.mark(puzzle, triple, false) {
                        return Some(step);
                    }
                }
                if unknown && hidden == size.saturating_sub(hint) {
                    if sure_hidden {
                        return Some(Step::Remove(triple));
                    }
                    if let Some(step) = driver.mark(puzzle, triple, true) {
                        return Some(step);
                    }
                }
                if sure_seen && let Some(step) = driver.mark(puzzle, triple, true) {
                    return Some(step);
                }
                if sure_hidden && let Some(step) = driver.mark(puzzle, triple, false) {
                    return Some(step);
                }
            }
        }
        None
    }
}

impl Process<Puzzle> for CellVisibilityProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.driver.id
    }

    fn ram_requirement(&self) -> u64 {
        VISIBILITY_COUNT_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        self.driver.tick(puzzle, Self::find)
    }

    fn return_value(&self) -> Outcome {
        Outcome::Visibility {
            changes: self.driver.changes,
        }
    }
}

// =============================================================================
// TOWER VISIBILITY
// =============================================================================

/// Classifies each tower height of a hinted line as seen, hidden, or
/// unknown, over every position the height can still take.
///
/// Stops as soon as any contradiction is active.
#[derive(Debug, Clone)]
pub struct TowerVisibilityProcess {
    driver: Driver,
}

impl TowerVisibilityProcess {
    #[must_use]
    pub fn new(direction: Direction, index: usize) -> Self {
        Self {
            driver: Driver::new("tower", direction, index),
        }
    }

    fn find(puzzle: &Puzzle, driver: &Driver, hint: usize) -> Option<Step> {
        let view = LineView::read(puzzle, driver.direction, driver.index)?;
        let size = view.size;

        let heights: Vec<(usize, Vec<usize>, bool, bool)> = (0..size)
            .filter_map(|val| {
                let positions = view.positions_of(val);
                if positions.is_empty() {
                    return None;
                }
                let seen = positions.iter().all(|&p| view.surely_seen(p, val));
                let hidden = positions.iter().all(|&p| view.surely_hidden(p, val));
                Some((val, positions, seen, hidden))
            })
            .collect();

        let seen = heights.iter().filter(|h| h.2).count();
        let hidden = heights.iter().filter(|h| h.3).count();
        if seen > hint || hidden > size.saturating_sub(hint) {
            return Some(Step::Contradiction { seen, hidden });
        }

        for (val, positions, height_seen, height_hidden) in &heights {
            let unknown = !height_seen && !height_hidden;
            for &position in positions {
                let triple = view.triple(position, *val)?;
                if unknown && seen == hint {
                    if view.surely_seen(position, *val) {
                        return Some(Step::Remove(triple));
                    }
                    if let Some(step) = driver.mark(puzzle, triple, false) {
                        return Some(step);
                    }
                }
                if unknown && hidden == size.saturating_sub(hint) {
                    if view.surely_hidden(position, *val) {
                        return Some(Step::Remove(triple));
                    }
                    if let Some(step) = driver.mark(puzzle, triple, true) {
                        return Some(step);
                    }
                }
                if *height_seen && let Some(step) = driver.mark(puzzle, triple, true) {
                    return Some(step);
                }
                if *height_hidden && let Some(step) = driver.mark(puzzle, triple, false) {
                    return Some(step);
                }
            }
        }
        None
    }
}

impl Process<Puzzle> for TowerVisibilityProcess {
    type Output = Outcome;

    fn process_id(&self) -> &ProcessId {
        &self.driver.id
    }

    fn ram_requirement(&self) -> u64 {
        VISIBILITY_COUNT_RAM
    }

    fn tick(&mut self, puzzle: &mut Puzzle) -> bool {
        self.driver.tick(puzzle, Self::find)
    }

    fn return_value(&self) -> Outcome {
        Outcome::Visibility {
            changes: self.driver.changes,
        }
    }
}
