//! # History
//!
//! Append-only log of puzzle mutations plus the guess markers that
//! demarcate speculative choices.
//!
//! Every cell action stores the cell's *previous* possibility set
//! verbatim (not a delta), so undoing is a plain restore. Guess markers
//! are history indices and are strictly increasing.

use super::implications::ImplicationKind;
use crate::types::{Direction, Triple};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// ACTIONS
// =============================================================================

/// One recorded puzzle mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Cell narrowed to a single value.
    SetCell {
        row: usize,
        col: usize,
        val: usize,
        previous: BTreeSet<usize>,
    },
    /// Value added back to a cell.
    AddToCell {
        row: usize,
        col: usize,
        val: usize,
        previous: BTreeSet<usize>,
    },
    /// Value removed from a cell.
    RemoveFromCell {
        row: usize,
        col: usize,
        val: usize,
        previous: BTreeSet<usize>,
    },
    /// Every value removed from a cell.
    ClearCell {
        row: usize,
        col: usize,
        previous: BTreeSet<usize>,
    },
    /// A view hint marked as dealt with.
    MarkHint { direction: Direction, index: usize },
    /// A view hint mark removed.
    UnmarkHint { direction: Direction, index: usize },
    /// An implication (and its contrapositive) recorded.
    AddImplication {
        kind: ImplicationKind,
        from: Triple,
        to: Triple,
    },
    /// An implication (and its contrapositive) dropped.
    RemoveImplication {
        kind: ImplicationKind,
        from: Triple,
        to: Triple,
    },
    /// A seen (`seen == true`) or hidden mark recorded.
    AddVisibility {
        triple: Triple,
        direction: Direction,
        seen: bool,
    },
}

impl Action {
    /// The cell a cell action touched and its previous values.
    #[must_use]
    pub fn cell_change(&self) -> Option<(usize, usize, &BTreeSet<usize>)> {
        match self {
            Action::SetCell {
                row, col, previous, ..
            }
            | Action::AddToCell {
                row, col, previous, ..
            }
            | Action::RemoveFromCell {
                row, col, previous, ..
            }
            | Action::ClearCell { row, col, previous } => Some((*row, *col, previous)),
            _ => None,
        }
    }

    /// The triple a `SetCell` action asserted.
    #[must_use]
    pub fn set_triple(&self) -> Option<Triple> {
        match self {
            Action::SetCell { row, col, val, .. } => Some(Triple::new(*row, *col, *val)),
            _ => None,
        }
    }
}

/// Notification sent to action observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent<'a> {
    /// The action was applied and appended.
    Applied(&'a Action),
    /// The action was popped and inverted.
    Undone(&'a Action),
}

// =============================================================================
// HISTORY
// =============================================================================

/// Ordered actions plus the guess-marker stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    actions: Vec<Action>,
    guesses: Vec<usize>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action and return its index.
    pub fn push(&mut self, action: Action) -> usize {
        self.actions.push(action);
        self.actions.len().saturating_sub(1)
    }

    /// Pop the last action, dropping a guess marker that pointed at it.
    pub fn pop(&mut self) -> Option<Action> {
        let action = self.actions.pop()?;
        if self.guesses.last() == Some(&self.actions.len()) {
            self.guesses.pop();
        }
        Some(action)
    }

    /// Mark the next action to be pushed as a guess.
    ///
    /// Returns `false` if the current length is already marked.
    pub fn mark_guess(&mut self) -> bool {
        let index = self.actions.len();
        if self.guesses.last().is_some_and(|&last| last >= index) {
            return false;
        }
        self.guesses.push(index);
        true
    }

    /// Drop a guess marker that no action was pushed behind.
    pub fn unmark_pending_guess(&mut self) {
        if self.guesses.last() == Some(&self.actions.len()) {
            self.guesses.pop();
        }
    }

    /// Index of the most recent guess, if any.
    #[must_use]
    pub fn last_guess(&self) -> Option<usize> {
        self.guesses.last().copied()
    }

    /// The action at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// The most recent action.
    #[must_use]
    pub fn last(&self) -> Option<&Action> {
        self.actions.last()
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of open guesses.
    #[must_use]
    pub fn guess_depth(&self) -> usize {
        self.guesses.len()
    }

    /// Guess markers, oldest first.
    #[must_use]
    pub fn guesses(&self) -> &[usize] {
        &self.guesses
    }

    /// All actions, oldest first.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(index: usize) -> Action {
        Action::MarkHint {
            direction: Direction::Top,
            index,
        }
    }

    #[test]
    fn pop_drops_matching_guess_marker() {
        let mut history = History::new();
        history.push(hint(0));
        assert!(history.mark_guess());
        history.push(hint(1));
        history.push(hint(2));

        assert_eq!(history.last_guess(), Some(1));
        history.pop();
        assert_eq!(history.guess_depth(), 1);
        history.pop();
        assert_eq!(history.guess_depth(), 0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn guess_markers_strictly_increase() {
        let mut history = History::new();
        assert!(history.mark_guess());
        assert!(!history.mark_guess());
        history.unmark_pending_guess();
        assert_eq!(history.guess_depth(), 0);
    }

    #[test]
    fn set_triple_only_for_set_cell() {
        let set = Action::SetCell {
            row: 1,
            col: 2,
            val: 3,
            previous: BTreeSet::new(),
        };
        assert_eq!(set.set_triple(), Some(Triple::new(1, 2, 3)));
        assert_eq!(hint(0).set_triple(), None);
        assert!(set.cell_change().is_some());
        assert!(hint(0).cell_change().is_none());
    }
}
