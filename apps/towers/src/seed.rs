//! # Seed Files
//!
//! Puzzle seeds on disk are JSON:
//!
//! ```json
//! {
//!   "size": 4,
//!   "hints": { "top": [3, 2, 1, 2], "left": [2, null, 1, 4] },
//!   "givens": [{ "row": 0, "col": 1, "val": 0 }]
//! }
//! ```
//!
//! Hints count visible towers (1..=size); `null` or a missing edge means no
//! hint. Givens use zero-based rows, columns, and values.

use std::path::{Path, PathBuf};
use towers_core::{Puzzle, PuzzleSeed, TowersError};

/// Maximum seed or grid file size (1 MB).
const MAX_SEED_FILE_SIZE: u64 = 1024 * 1024;

/// Parse and validate a seed from JSON text.
pub fn parse_seed(text: &str) -> Result<PuzzleSeed, TowersError> {
    let seed: PuzzleSeed =
        serde_json::from_str(text).map_err(|e| TowersError::SerializationError(e.to_string()))?;
    seed.validated()
}

/// Read a seed file.
pub fn load_seed(path: &Path) -> Result<PuzzleSeed, TowersError> {
    parse_seed(&read_limited(path)?)
}

fn read_limited(path: &Path) -> Result<String, TowersError> {
    let path = validate_file_path(path)?;
    let metadata = std::fs::metadata(&path)
        .map_err(|e| TowersError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_SEED_FILE_SIZE {
        return Err(TowersError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_SEED_FILE_SIZE
        )));
    }

    std::fs::read_to_string(&path)
        .map_err(|e| TowersError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

/// Parse a filled grid: rows of one-based heights.
///
/// Returns zero-based values, checked against `size`.
pub fn parse_grid(text: &str, size: usize) -> Result<Vec<Vec<usize>>, TowersError> {
    let rows: Vec<Vec<usize>> =
        serde_json::from_str(text).map_err(|e| TowersError::SerializationError(e.to_string()))?;
    if rows.len() != size || rows.iter().any(|row| row.len() != size) {
        return Err(TowersError::InvalidSeed(format!(
            "grid must be {} rows of {} heights",
            size, size
        )));
    }
    rows.into_iter()
        .enumerate()
        .map(|(row, heights)| {
            heights
                .into_iter()
                .enumerate()
                .map(|(col, height)| {
                    height.checked_sub(1).filter(|&val| val < size).ok_or_else(|| {
                        TowersError::InvalidSeed(format!(
                            "height {} at ({}, {}) outside 1..={}",
                            height, row, col, size
                        ))
                    })
                })
                .collect::<Result<Vec<usize>, TowersError>>()
        })
        .collect()
}

/// Read a grid file.
pub fn load_grid(path: &Path, size: usize) -> Result<Vec<Vec<usize>>, TowersError> {
    parse_grid(&read_limited(path)?, size)
}

/// Read a seed file and build the puzzle.
pub fn load_puzzle(path: &Path) -> Result<Puzzle, TowersError> {
    Puzzle::from_seed(load_seed(path)?)
}

fn validate_file_path(path: &Path) -> Result<PathBuf, TowersError> {
    let canonical = path.canonicalize().map_err(|e| {
        TowersError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;
    if !canonical.is_file() {
        return Err(TowersError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    Ok(canonical)
}
