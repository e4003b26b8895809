//! # towers-core
//!
//! The simulated computer and the Towers puzzle engine.
//!
//! A cooperative CPU with a fixed number of cores and a RAM budget admits
//! small, resumable inference processes from a priority queue and advances
//! them one tick at a time. The processes read and mutate a [`Puzzle`]: an
//! N x N skyscraper grid with a triple-indexed possibility store, an
//! implication graph, seen/hidden marks, and an undoable history with
//! guesses and contradictions.
//!
//! ## Architectural Constraints
//!
//! - No async, no I/O: the surrounding application owns the clock and files
//! - Single-threaded: within a pulse, processes tick strictly one after another
//! - Deterministic ordering: BTreeMap/BTreeSet only
//! - Contradictions are domain signals recorded on the puzzle, not errors

// =============================================================================
// MODULES
// =============================================================================

pub mod primitives;
pub mod priority_queue;
pub mod processes;
pub mod puzzle;
pub mod resources;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod fixtures;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Direction, Line, ProcessId, TowersError, Triple};

// =============================================================================
// RE-EXPORTS: Simulated Computer
// =============================================================================

pub use priority_queue::PriorityQueue;
pub use resources::ResourceManager;
pub use scheduler::{
    Beat, BoxedProcess, Callback, Lane, Process, PulseClock, PulseReport, Scheduler,
    SchedulerConfig,
};

// =============================================================================
// RE-EXPORTS: Puzzle
// =============================================================================

pub use puzzle::{
    Action, Closure, Contradiction, ContradictionKind, Hints, History, HistoryEvent,
    ImplicationKind, ImplicationsTracker, Puzzle, PuzzleSeed, PuzzleSnapshot, TripleCollection,
    VisibilityInfo, VisibilityTracker,
};

// =============================================================================
// RE-EXPORTS: Processes
// =============================================================================

pub use processes::{
    CellVisibilityProcess, FollowImplicationsProcess, HintBoundsProcess, OnlyChoiceProcess,
    Outcome, PairImplicationsProcess, PuzzleProcess, PuzzleScheduler, RandomGuessProcess,
    RemoveFromLineProcess, TowerVisibilityProcess, Unit, ValidationProcess,
};
