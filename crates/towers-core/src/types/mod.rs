//! # Core Type Definitions
//!
//! This module contains the small value types shared by every part of the
//! engine:
//! - Grid coordinates (`Triple`, `Line`, `Direction`)
//! - Process identity (`ProcessId`)
//! - Error types (`TowersError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer coordinates only
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TRIPLE
// =============================================================================

/// One candidate assignment: the tower in `(row, col)` has height index `val`.
///
/// Values are zero-based; a value `v` is a tower of height `v + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub row: usize,
    pub col: usize,
    pub val: usize,
}

impl Triple {
    /// Create a new triple.
    #[must_use]
    pub const fn new(row: usize, col: usize, val: usize) -> Self {
        Self { row, col, val }
    }

    /// The cell this triple lives in.
    #[must_use]
    pub const fn cell(self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})={}", self.row, self.col, self.val.saturating_add(1))
    }
}

// =============================================================================
// LINES AND DIRECTIONS
// =============================================================================

/// A row or a column of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Line {
    Row(usize),
    Column(usize),
}

impl Line {
    /// Cells of the line in ascending order.
    #[must_use]
    pub fn cells(self, size: usize) -> Vec<(usize, usize)> {
        match self {
            Line::Row(row) => (0..size).map(|col| (row, col)).collect(),
            Line::Column(col) => (0..size).map(|row| (row, col)).collect(),
        }
    }

    /// The cell at `position` along the line.
    #[must_use]
    pub const fn at(self, position: usize) -> (usize, usize) {
        match self {
            Line::Row(row) => (row, position),
            Line::Column(col) => (position, col),
        }
    }

    /// Index of the line (row number or column number).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Line::Row(i) | Line::Column(i) => i,
        }
    }

    /// The line through `triple` running in the same orientation as `self`.
    #[must_use]
    pub const fn through(self, triple: Triple) -> Self {
        match self {
            Line::Row(_) => Line::Row(triple.row),
            Line::Column(_) => Line::Column(triple.col),
        }
    }

    /// Short name used in process ids and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Line::Row(_) => "row",
            Line::Column(_) => "column",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.index())
    }
}

/// The grid edge a view hint is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Looking down a column from above the grid.
    Top,
    /// Looking up a column from below the grid.
    Bottom,
    /// Looking along a row from the left edge.
    Left,
    /// Looking along a row from the right edge.
    Right,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    /// Cells seen from this edge at `index`, nearest cell first.
    ///
    /// `index` is a column for `Top`/`Bottom` and a row for `Left`/`Right`.
    #[must_use]
    pub fn line_cells(self, size: usize, index: usize) -> Vec<(usize, usize)> {
        match self {
            Direction::Top => (0..size).map(|row| (row, index)).collect(),
            Direction::Bottom => (0..size).rev().map(|row| (row, index)).collect(),
            Direction::Left => (0..size).map(|col| (index, col)).collect(),
            Direction::Right => (0..size).rev().map(|col| (index, col)).collect(),
        }
    }

    /// Lowercase name used in process ids and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PROCESS IDENTITY
// =============================================================================

/// Identity of a scheduled process.
///
/// Ids are derived from the process kind and its parameters, so the same
/// piece of work submitted twice maps to the same id and the second
/// registration is rejected by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub String);

impl ProcessId {
    /// Create a process id from any string-like value.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Towers engine.
///
/// Puzzle contradictions are NOT errors: they are recorded on the puzzle
/// and resolved by undoing. This enum only covers malformed input and
/// the I/O of the surrounding application.
#[derive(Debug, Error)]
pub enum TowersError {
    /// The puzzle seed is malformed.
    #[error("Invalid puzzle seed: {0}")]
    InvalidSeed(String),

    /// A coordinate lies outside the grid.
    #[error("Coordinate out of range: {0} (grid size {1})")]
    OutOfRange(Triple, usize),

    /// The configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_display_uses_heights() {
        assert_eq!(Triple::new(1, 2, 0).to_string(), "(1, 2)=1");
    }

    #[test]
    fn direction_lines_start_at_the_edge() {
        assert_eq!(Direction::Top.line_cells(3, 1), vec![(0, 1), (1, 1), (2, 1)]);
        assert_eq!(Direction::Bottom.line_cells(3, 1), vec![(2, 1), (1, 1), (0, 1)]);
        assert_eq!(Direction::Left.line_cells(3, 2), vec![(2, 0), (2, 1), (2, 2)]);
        assert_eq!(Direction::Right.line_cells(3, 2), vec![(2, 2), (2, 1), (2, 0)]);
    }

    #[test]
    fn line_through_keeps_orientation() {
        let t = Triple::new(3, 1, 0);
        assert_eq!(Line::Row(0).through(t), Line::Row(3));
        assert_eq!(Line::Column(0).through(t), Line::Column(1));
        assert_eq!(Line::Column(1).at(3), (3, 1));
    }

    #[test]
    fn process_id_display_is_raw_string() {
        let id = ProcessId::new("remove-from-row:0,1,2");
        assert_eq!(id.to_string(), "remove-from-row:0,1,2");
        assert_eq!(id.as_str(), "remove-from-row:0,1,2");
    }
}
