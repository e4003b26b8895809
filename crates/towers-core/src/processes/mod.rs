//! # Inference Processes
//!
//! Concrete processes the CPU runs against a [`Puzzle`].
//!
//! Almost every process follows the same beat discipline: an inspect beat
//! reads puzzle state (and may finish early when nothing is actionable),
//! the following apply beat performs at most one mutation and moves the
//! cursor on. A process therefore never makes more than one visible change
//! per `tick()`.
//!
//! Contradiction handling is per process: some stop as soon as a
//! contradiction is active, others keep going and leave the decision to
//! whoever reads their outcome.

pub mod eliminate;
pub mod follow;
pub mod guess;
pub mod hint_bounds;
pub mod only_choice;
pub mod pairs;
pub mod validation;
pub mod visibility;

pub use eliminate::RemoveFromLineProcess;
pub use follow::FollowImplicationsProcess;
pub use guess::RandomGuessProcess;
pub use hint_bounds::HintBoundsProcess;
pub use only_choice::OnlyChoiceProcess;
pub use pairs::{PairImplicationsProcess, Unit};
pub use validation::ValidationProcess;
pub use visibility::{CellVisibilityProcess, TowerVisibilityProcess};

use crate::puzzle::Puzzle;
use crate::scheduler::{BoxedProcess, Scheduler};
use crate::types::{Line, Triple};
use serde::{Deserialize, Serialize};

/// A process that runs against a puzzle.
pub type PuzzleProcess = BoxedProcess<Puzzle, Outcome>;

/// The CPU specialised to puzzle processes.
pub type PuzzleScheduler = Scheduler<Puzzle, Outcome>;

// =============================================================================
// OUTCOME
// =============================================================================

/// What a puzzle process reports when it retires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Row/column elimination.
    Eliminated { removed: usize },
    /// Only-choice scan of `val` along `line`: how many cells could hold
    /// it, and the assignment made when exactly one could.
    OnlyChoice {
        line: Line,
        val: usize,
        candidates: usize,
        assigned: Option<Triple>,
    },
    /// Whole-grid check and its narrated comparisons.
    Validation { valid: bool, log: Vec<String> },
    /// The triple guessed, if any was left to guess.
    Guess(Option<Triple>),
    /// Seen/hidden propagation.
    Visibility { changes: usize },
    /// Implication closure application.
    Followed { changes: usize },
    /// View-hint bound propagation.
    HintBounds { changes: usize },
    /// Pair implications recorded.
    Implications { added: usize },
}

impl Outcome {
    /// Whether the process changed the puzzle.
    #[must_use]
    pub fn changed_puzzle(&self) -> bool {
        match self {
            Outcome::Eliminated { removed } => *removed > 0,
            Outcome::OnlyChoice { assigned, .. } => assigned.is_some(),
            Outcome::Validation { .. } => false,
            Outcome::Guess(guess) => guess.is_some(),
            Outcome::Visibility { changes }
            | Outcome::Followed { changes }
            | Outcome::HintBounds { changes } => *changes > 0,
            Outcome::Implications { added } => *added > 0,
        }
    }
}

// =============================================================================
// FORCED CHANGES
// =============================================================================

/// A single forced assertion or exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Change {
    Set(Triple),
    Exclude(Triple),
}

impl Change {
    /// Whether applying the change would alter the puzzle.
    pub(crate) fn is_pending(self, puzzle: &Puzzle) -> bool {
        match self {
            Change::Set(t) => puzzle.solved_value(t.row, t.col) != Some(t.val),
            Change::Exclude(t) => puzzle.is_possible(t),
        }
    }

    /// Apply the change. A forced set of an already excluded triple empties
    /// the cell, which raises `NoPossibilities`.
    pub(crate) fn apply(self, puzzle: &mut Puzzle) -> bool {
        match self {
            Change::Set(t) if !puzzle.is_possible(t) => puzzle.clear_cell(t.row, t.col),
            Change::Set(t) => puzzle.set_cell(t.row, t.col, t.val).unwrap_or(false),
            Change::Exclude(t) => puzzle.remove_from_cell(t.row, t.col, t.val),
        }
    }
}
