//! # Hints and Seeds
//!
//! View hints around the grid and the seed a puzzle is rebuilt from.
//!
//! A puzzle is fully reconstructible from its seed; history, guesses, and
//! contradictions are runtime-only state.

use crate::primitives::{MAX_PUZZLE_SIZE, MIN_PUZZLE_SIZE};
use crate::types::{Direction, TowersError, Triple};
use serde::{Deserialize, Serialize};

/// View hints for each edge. `None` means no hint at that position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hints {
    pub top: Vec<Option<usize>>,
    pub bottom: Vec<Option<usize>>,
    pub left: Vec<Option<usize>>,
    pub right: Vec<Option<usize>>,
}

impl Hints {
    /// No hints on any edge of an N x N grid.
    #[must_use]
    pub fn empty(size: usize) -> Self {
        Self {
            top: vec![None; size],
            bottom: vec![None; size],
            left: vec![None; size],
            right: vec![None; size],
        }
    }

    /// Hints along one edge.
    #[must_use]
    pub fn get(&self, direction: Direction) -> &[Option<usize>] {
        match direction {
            Direction::Top => &self.top,
            Direction::Bottom => &self.bottom,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// The hint at `index` on one edge.
    #[must_use]
    pub fn hint(&self, direction: Direction, index: usize) -> Option<usize> {
        self.get(direction).get(index).copied().flatten()
    }

    /// Every `(direction, index, hint)` that carries a hint.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, usize, usize)> + '_ {
        Direction::ALL.into_iter().flat_map(move |direction| {
            self.get(direction)
                .iter()
                .enumerate()
                .filter_map(move |(index, &hint)| hint.map(|h| (direction, index, h)))
        })
    }

    fn validate(&self, size: usize) -> Result<(), TowersError> {
        for direction in Direction::ALL {
            let edge = self.get(direction);
            if !edge.is_empty() && edge.len() != size {
                return Err(TowersError::InvalidSeed(format!(
                    "{} hints have length {}, expected {}",
                    direction,
                    edge.len(),
                    size
                )));
            }
            if let Some(bad) = edge.iter().flatten().find(|&&h| h == 0 || h > size) {
                return Err(TowersError::InvalidSeed(format!(
                    "{} hint {} outside 1..={}",
                    direction, bad, size
                )));
            }
        }
        Ok(())
    }

    /// Pad missing edges with `None` so every edge has length `size`.
    fn normalized(mut self, size: usize) -> Self {
        for edge in [
            &mut self.top,
            &mut self.bottom,
            &mut self.left,
            &mut self.right,
        ] {
            if edge.is_empty() {
                *edge = vec![None; size];
            }
        }
        self
    }
}

/// Everything needed to rebuild a puzzle from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSeed {
    pub size: usize,
    #[serde(default)]
    pub hints: Hints,
    /// Cells fixed before play starts.
    #[serde(default)]
    pub givens: Vec<Triple>,
}

impl PuzzleSeed {
    /// A seed with no hints and no givens.
    #[must_use]
    pub fn blank(size: usize) -> Self {
        Self {
            size,
            hints: Hints::empty(size),
            givens: Vec::new(),
        }
    }

    /// Check sizes and ranges; returns the seed with every edge padded.
    pub fn validated(self) -> Result<Self, TowersError> {
        if !(MIN_PUZZLE_SIZE..=MAX_PUZZLE_SIZE).contains(&self.size) {
            return Err(TowersError::InvalidSeed(format!(
                "size {} outside {}..={}",
                self.size, MIN_PUZZLE_SIZE, MAX_PUZZLE_SIZE
            )));
        }
        self.hints.validate(self.size)?;
        for given in &self.givens {
            if given.row >= self.size || given.col >= self.size || given.val >= self.size {
                return Err(TowersError::OutOfRange(*given, self.size));
            }
        }
        let size = self.size;
        Ok(Self {
            hints: self.hints.normalized(size),
            ..self
        })
    }
}
