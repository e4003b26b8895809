//! # Contradictions
//!
//! Recoverable domain signals raised while solving. A contradiction is
//! never an error: it is recorded on the puzzle and resolved by undoing.

use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of impossibility was observed, with positional context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContradictionKind {
    /// A cell has no possible value left.
    NoPossibilities { row: usize, col: usize },
    /// Two cells of a row are forced to the same value, or (with no
    /// `cols`) no cell of the row can hold it.
    Row {
        row: usize,
        cols: Vec<usize>,
        val: usize,
    },
    /// Two cells of a column are forced to the same value, or (with no
    /// `rows`) no cell of the column can hold it.
    Column {
        col: usize,
        rows: Vec<usize>,
        val: usize,
    },
    /// A view hint cannot be met.
    View {
        direction: Direction,
        index: usize,
        seen: usize,
        hidden: usize,
    },
}

/// A contradiction and the history length at which it was first observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub kind: ContradictionKind,
    pub history_index: usize,
}

impl fmt::Display for Contradiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ContradictionKind::NoPossibilities { row, col } => {
                write!(f, "cell ({}, {}) has no possibilities", row, col)
            }
            ContradictionKind::Row { row, cols, val } => {
                write_line(f, "row", *row, "columns", cols, *val)
            }
            ContradictionKind::Column { col, rows, val } => {
                write_line(f, "column", *col, "rows", rows, *val)
            }
            ContradictionKind::View {
                direction,
                index,
                seen,
                hidden,
            } => write!(
                f,
                "{} hint {} cannot be met ({} seen, {} hidden for sure)",
                direction, index, seen, hidden
            ),
        }?;
        write!(f, " [at history {}]", self.history_index)
    }
}

fn write_line(
    f: &mut fmt::Formatter<'_>,
    line: &str,
    index: usize,
    across: &str,
    at: &[usize],
    val: usize,
) -> fmt::Result {
    let height = val.saturating_add(1);
    if at.is_empty() {
        return write!(f, "{} {} has no place for {}", line, index, height);
    }
    let at: Vec<String> = at.iter().map(ToString::to_string).collect();
    write!(f, "{} {} has {} in {} {}", line, index, height, across, at.join(" and "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_heights() {
        let c = Contradiction {
            kind: ContradictionKind::Row {
                row: 0,
                cols: vec![1, 3],
                val: 1,
            },
            history_index: 7,
        };
        assert_eq!(c.to_string(), "row 0 has 2 in columns 1 and 3 [at history 7]");
    }

    #[test]
    fn display_names_a_missing_height() {
        let c = Contradiction {
            kind: ContradictionKind::Column {
                col: 2,
                rows: Vec::new(),
                val: 0,
            },
            history_index: 3,
        };
        assert_eq!(c.to_string(), "column 2 has no place for 1 [at history 3]");
    }
}
