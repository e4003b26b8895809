//! # Puzzle
//!
//! The Towers grid and the mutation API every process goes through.
//!
//! The puzzle owns the three trackers (possibilities, implications,
//! visibility), an undoable action history with guess markers, and at
//! most one active contradiction.
//!
//! ## Invariants
//!
//! - Every mutation that changes state appends exactly one [`Action`];
//!   no-op mutations append nothing.
//! - Undoing an action restores the exact previous state it captured.
//! - The contradiction kept is the earliest one observed. It is cleared
//!   as soon as history is rewound to (or past) the length at which it was
//!   observed.
//! - History, guesses, and contradictions are runtime-only; a puzzle is
//!   rebuilt from its [`PuzzleSeed`] alone.

pub mod contradiction;
pub mod hints;
pub mod history;
pub mod implications;
pub mod triples;
pub mod visibility;

pub use contradiction::{Contradiction, ContradictionKind};
pub use hints::{Hints, PuzzleSeed};
pub use history::{Action, History, HistoryEvent};
pub use implications::{Closure, ImplicationKind, ImplicationsTracker};
pub use triples::TripleCollection;
pub use visibility::{VisibilityInfo, VisibilityTracker};

use crate::types::{Direction, TowersError, Triple};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Observer of applied and undone actions.
pub type ActionListener = Box<dyn FnMut(HistoryEvent<'_>)>;

/// Observer of newly raised contradictions.
pub type ContradictionListener = Box<dyn FnMut(&Contradiction)>;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Comparable picture of everything undo must restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSnapshot {
    pub cells: BTreeMap<(usize, usize), BTreeSet<usize>>,
    pub hint_marks: BTreeSet<(Direction, usize)>,
    pub implications: Vec<(&'static str, Triple, Triple)>,
    pub visibility: Vec<(Triple, Direction, VisibilityInfo)>,
}

// =============================================================================
// PUZZLE
// =============================================================================

/// An N x N Towers puzzle under construction.
pub struct Puzzle {
    seed: PuzzleSeed,
    triples: TripleCollection,
    implications: ImplicationsTracker,
    visibility: VisibilityTracker,
    hint_marks: BTreeSet<(Direction, usize)>,
    history: History,
    contradiction: Option<Contradiction>,
    action_listeners: Vec<ActionListener>,
    contradiction_listeners: Vec<ContradictionListener>,
}

impl fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Puzzle")
            .field("size", &self.size())
            .field("history_len", &self.history.len())
            .field("guess_depth", &self.history.guess_depth())
            .field("contradiction", &self.contradiction)
            .finish()
    }
}

impl Puzzle {
    /// Build a puzzle from a seed. Givens are applied without history.
    pub fn from_seed(seed: PuzzleSeed) -> Result<Self, TowersError> {
        let seed = seed.validated()?;
        let mut triples = TripleCollection::new(seed.size);
        for given in &seed.givens {
            let only: BTreeSet<usize> = [given.val].into_iter().collect();
            triples.replace_cell(given.row, given.col, &only);
        }

        Ok(Self {
            seed,
            triples,
            implications: ImplicationsTracker::new(),
            visibility: VisibilityTracker::new(),
            hint_marks: BTreeSet::new(),
            history: History::new(),
            contradiction: None,
            action_listeners: Vec::new(),
            contradiction_listeners: Vec::new(),
        })
    }

    /// A puzzle without hints or givens.
    pub fn blank(size: usize) -> Result<Self, TowersError> {
        Self::from_seed(PuzzleSeed::blank(size))
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Grid size N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.seed.size
    }

    /// The seed this puzzle was built from.
    #[must_use]
    pub fn seed(&self) -> &PuzzleSeed {
        &self.seed
    }

    /// Values still possible in `(row, col)`.
    #[must_use]
    pub fn marks_cell(&self, row: usize, col: usize) -> BTreeSet<usize> {
        self.triples.row_col(row, col)
    }

    /// The value of a solved cell.
    #[must_use]
    pub fn solved_value(&self, row: usize, col: usize) -> Option<usize> {
        let marks = self.triples.row_col(row, col);
        match (marks.len(), marks.first()) {
            (1, Some(&val)) => Some(val),
            _ => None,
        }
    }

    /// Whether `triple` is still possible.
    #[must_use]
    pub fn is_possible(&self, triple: Triple) -> bool {
        self.contains_cell(triple.row, triple.col) && self.triples.has(triple)
    }

    /// The possibility store.
    #[must_use]
    pub fn triples(&self) -> &TripleCollection {
        &self.triples
    }

    /// The implication graph.
    #[must_use]
    pub fn implications(&self) -> &ImplicationsTracker {
        &self.implications
    }

    /// The seen/hidden marks.
    #[must_use]
    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    /// The action history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of open guesses.
    #[must_use]
    pub fn guess_depth(&self) -> usize {
        self.history.guess_depth()
    }

    /// Every cell holds exactly one value.
    #[must_use]
    pub fn is_ready_for_validation(&self) -> bool {
        let size = self.size();
        (0..size).all(|row| (0..size).all(|col| self.triples.count_row_col(row, col) == 1))
    }

    /// Cells seen from an edge, nearest first.
    #[must_use]
    pub fn line_cells(&self, direction: Direction, index: usize) -> Vec<(usize, usize)> {
        direction.line_cells(self.size(), index)
    }

    /// Comparable picture of the undoable state.
    #[must_use]
    pub fn snapshot(&self) -> PuzzleSnapshot {
        let size = self.size();
        let mut cells = BTreeMap::new();
        for row in 0..size {
            for col in 0..size {
                cells.insert((row, col), self.marks_cell(row, col));
            }
        }
        PuzzleSnapshot {
            cells,
            hint_marks: self.hint_marks.clone(),
            implications: self.implications.edges(),
            visibility: self.visibility.iter().collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Cell mutation
    // -------------------------------------------------------------------------

    /// Narrow `(row, col)` to exactly `val`.
    ///
    /// Returns whether the cell changed.
    pub fn set_cell(&mut self, row: usize, col: usize, val: usize) -> Result<bool, TowersError> {
        self.check(Triple::new(row, col, val))?;
        let only: BTreeSet<usize> = [val].into_iter().collect();
        if self.triples.row_col(row, col) == only {
            return Ok(false);
        }
        let previous = self.triples.replace_cell(row, col, &only);
        self.record(Action::SetCell {
            row,
            col,
            val,
            previous,
        });
        Ok(true)
    }

    /// Put `val` back into `(row, col)`.
    pub fn add_to_cell(&mut self, row: usize, col: usize, val: usize) -> Result<bool, TowersError> {
        self.check(Triple::new(row, col, val))?;
        if self.triples.has(Triple::new(row, col, val)) {
            return Ok(false);
        }
        let previous = self.triples.row_col(row, col);
        self.triples.add(Triple::new(row, col, val));
        self.record(Action::AddToCell {
            row,
            col,
            val,
            previous,
        });
        Ok(true)
    }

    /// Strike `val` from `(row, col)`.
    ///
    /// Raises `NoPossibilities` if the cell ends up empty. Cells outside the
    /// grid hold nothing to strike.
    pub fn remove_from_cell(&mut self, row: usize, col: usize, val: usize) -> bool {
        if !self.contains_cell(row, col) {
            return false;
        }
        let previous = self.triples.row_col(row, col);
        if !previous.contains(&val) {
            return false;
        }
        self.triples.delete(Triple::new(row, col, val));
        let emptied = previous.len() == 1;
        self.record(Action::RemoveFromCell {
            row,
            col,
            val,
            previous,
        });
        if emptied {
            self.raise_contradiction(ContradictionKind::NoPossibilities { row, col });
        }
        true
    }

    /// Strike every value from `(row, col)` and raise `NoPossibilities`.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> bool {
        if !self.contains_cell(row, col) || self.triples.count_row_col(row, col) == 0 {
            return false;
        }
        let previous = self.triples.replace_cell(row, col, &BTreeSet::new());
        self.record(Action::ClearCell { row, col, previous });
        self.raise_contradiction(ContradictionKind::NoPossibilities { row, col });
        true
    }

    // -------------------------------------------------------------------------
    // Guesses and undo
    // -------------------------------------------------------------------------

    /// Assert `triple` speculatively, pushing a guess marker.
    ///
    /// Returns `Ok(false)` (and pushes nothing) if the triple is no longer
    /// possible or the cell already holds exactly that value.
    pub fn take_guess(&mut self, triple: Triple) -> Result<bool, TowersError> {
        self.check(triple)?;
        if !self.triples.has(triple) || !self.history.mark_guess() {
            return Ok(false);
        }
        if !self.set_cell(triple.row, triple.col, triple.val)? {
            self.history.unmark_pending_guess();
            return Ok(false);
        }
        info!(guess = %triple, depth = self.history.guess_depth(), "guess taken");
        Ok(true)
    }

    /// Pop the last action and apply its exact inverse.
    pub fn undo(&mut self) -> Option<Action> {
        let action = self.history.pop()?;
        self.invert(&action);

        for listener in &mut self.action_listeners {
            listener(HistoryEvent::Undone(&action));
        }

        if self
            .contradiction
            .as_ref()
            .is_some_and(|c| c.history_index >= self.history.len())
        {
            debug!("contradiction cleared by undo");
            self.contradiction = None;
        }
        Some(action)
    }

    /// Undo back through the most recent guess. Returns the guessed triple.
    pub fn abandon_guess(&mut self) -> Option<Triple> {
        let index = self.history.last_guess()?;
        let guessed = self.history.get(index).and_then(Action::set_triple);
        while self.history.len() > index {
            if self.undo().is_none() {
                break;
            }
        }
        if let Some(triple) = guessed {
            info!(guess = %triple, "guess abandoned");
        }
        guessed
    }

    /// Abandon the most recent guess and exclude the guessed triple.
    ///
    /// This is the backtracking step of a depth-first search.
    pub fn mark_guess_as_impossible(&mut self) -> Option<Triple> {
        let triple = self.abandon_guess()?;
        self.remove_from_cell(triple.row, triple.col, triple.val);
        Some(triple)
    }

    /// Undo everything.
    pub fn restart(&mut self) {
        while self.undo().is_some() {}
        self.contradiction = None;
    }

    // -------------------------------------------------------------------------
    // Contradictions
    // -------------------------------------------------------------------------

    /// The active contradiction, if any.
    #[must_use]
    pub fn contradiction(&self) -> Option<&Contradiction> {
        self.contradiction.as_ref()
    }

    /// Record a contradiction unless one is already active.
    ///
    /// Returns whether this contradiction became the active one.
    pub fn raise_contradiction(&mut self, kind: ContradictionKind) -> bool {
        if self.contradiction.is_some() {
            return false;
        }
        let contradiction = Contradiction {
            kind,
            history_index: self.history.len(),
        };
        info!(%contradiction, "contradiction raised");
        for listener in &mut self.contradiction_listeners {
            listener(&contradiction);
        }
        self.contradiction = Some(contradiction);
        true
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Subscribe to applied and undone actions.
    pub fn on_action(&mut self, listener: impl FnMut(HistoryEvent<'_>) + 'static) {
        self.action_listeners.push(Box::new(listener));
    }

    /// Subscribe to newly raised contradictions.
    pub fn on_contradiction(&mut self, listener: impl FnMut(&Contradiction) + 'static) {
        self.contradiction_listeners.push(Box::new(listener));
    }

    // -------------------------------------------------------------------------
    // Hints
    // -------------------------------------------------------------------------

    /// All view hints.
    #[must_use]
    pub fn hints(&self) -> &Hints {
        &self.seed.hints
    }

    /// View hints along one edge.
    #[must_use]
    pub fn get_hints(&self, direction: Direction) -> &[Option<usize>] {
        self.seed.hints.get(direction)
    }

    /// The hint at `index` on one edge.
    #[must_use]
    pub fn hint(&self, direction: Direction, index: usize) -> Option<usize> {
        self.seed.hints.hint(direction, index)
    }

    /// Whether a hint is marked as dealt with.
    #[must_use]
    pub fn is_hint_marked(&self, direction: Direction, index: usize) -> bool {
        self.hint_marks.contains(&(direction, index))
    }

    /// Mark a hint as dealt with.
    pub fn mark_hint(&mut self, direction: Direction, index: usize) -> bool {
        if !self.hint_marks.insert((direction, index)) {
            return false;
        }
        self.record(Action::MarkHint { direction, index });
        true
    }

    /// Remove a hint mark.
    pub fn unmark_hint(&mut self, direction: Direction, index: usize) -> bool {
        if !self.hint_marks.remove(&(direction, index)) {
            return false;
        }
        self.record(Action::UnmarkHint { direction, index });
        true
    }

    /// Flip a hint mark. Returns the new marked state.
    pub fn toggle_hint(&mut self, direction: Direction, index: usize) -> bool {
        if self.is_hint_marked(direction, index) {
            self.unmark_hint(direction, index);
            false
        } else {
            self.mark_hint(direction, index);
            true
        }
    }

    // -------------------------------------------------------------------------
    // Implications and visibility
    // -------------------------------------------------------------------------

    /// Record an implication (and its contrapositive).
    pub fn add_implication(&mut self, kind: ImplicationKind, from: Triple, to: Triple) -> bool {
        if !self.implications.add(kind, from, to) {
            return false;
        }
        self.record(Action::AddImplication { kind, from, to });
        true
    }

    /// Drop an implication (and its contrapositive).
    pub fn remove_implication(&mut self, kind: ImplicationKind, from: Triple, to: Triple) -> bool {
        if !self.implications.remove(kind, from, to) {
            return false;
        }
        self.record(Action::RemoveImplication { kind, from, to });
        true
    }

    /// Record that `triple`, if placed, must be seen (or hidden) from `direction`.
    pub fn add_visibility_info(&mut self, triple: Triple, direction: Direction, seen: bool) -> bool {
        if !self.visibility.add_info(triple, direction, seen) {
            return false;
        }
        self.record(Action::AddVisibility {
            triple,
            direction,
            seen,
        });
        true
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn contains_cell(&self, row: usize, col: usize) -> bool {
        row < self.size() && col < self.size()
    }

    fn check(&self, triple: Triple) -> Result<(), TowersError> {
        if self.contains_cell(triple.row, triple.col) && triple.val < self.size() {
            Ok(())
        } else {
            Err(TowersError::OutOfRange(triple, self.size()))
        }
    }

    fn record(&mut self, action: Action) {
        let index = self.history.push(action);
        if let Some(action) = self.history.get(index) {
            for listener in &mut self.action_listeners {
                listener(HistoryEvent::Applied(action));
            }
        }
    }

    fn invert(&mut self, action: &Action) {
        match action {
            Action::SetCell {
                row, col, previous, ..
            }
            | Action::AddToCell {
                row, col, previous, ..
            }
            | Action::RemoveFromCell {
                row, col, previous, ..
            }
            | Action::ClearCell { row, col, previous } => {
                self.triples.replace_cell(*row, *col, previous);
            }
            Action::MarkHint { direction, index } => {
                self.hint_marks.remove(&(*direction, *index));
            }
            Action::UnmarkHint { direction, index } => {
                self.hint_marks.insert((*direction, *index));
            }
            Action::AddImplication { kind, from, to } => {
                self.implications.remove(*kind, *from, *to);
            }
            Action::RemoveImplication { kind, from, to } => {
                self.implications.add(*kind, *from, *to);
            }
            Action::AddVisibility {
                triple,
                direction,
                seen,
            } => {
                self.visibility.remove_info(*triple, *direction, *seen);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
