//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Towers engine.
//!
//! The simulated computer starts with a fixed amount of RAM and a fixed
//! number of cores. Every process kind declares a static RAM cost; these
//! costs are compiled in and never change at runtime.

use std::time::Duration;

// =============================================================================
// SIMULATED COMPUTER
// =============================================================================

/// Default RAM budget of a freshly built computer.
pub const DEFAULT_RAM_CAPACITY: u64 = 3000;

/// Default number of cores (processes that may be active at once).
pub const DEFAULT_CORES: usize = 2;

/// Default pulse rate of the clock at 100% speed.
pub const DEFAULT_PULSES_PER_SECOND: u64 = 20;

/// Speed is expressed in percent so the clock never needs floats.
pub const DEFAULT_SPEED_PERCENT: u64 = 100;

/// A single `tick()` taking longer than this is reported as slow.
///
/// This is a soft diagnostic only; slow ticks are never aborted.
pub const SLOW_TICK_BUDGET: Duration = Duration::from_millis(5);

/// Micro-pulses per pulse. The clock accumulates fractional pulses in
/// these units.
pub const MICROS_PER_PULSE_UNIT: u64 = 1_000_000;

// =============================================================================
// PUZZLE LIMITS
// =============================================================================

/// Smallest supported grid.
pub const MIN_PUZZLE_SIZE: usize = 1;

/// Largest supported grid.
///
/// The inference processes are quadratic or cubic in the grid size;
/// anything above this is not a puzzle a player would be handed.
pub const MAX_PUZZLE_SIZE: usize = 16;

// =============================================================================
// PROCESS RAM COSTS
// =============================================================================

/// RAM cost of row/column elimination.
pub const REMOVE_FROM_LINE_RAM: u64 = 8;

/// RAM cost of the only-choice scan.
pub const ONLY_CHOICE_RAM: u64 = 12;

/// RAM cost of view-hint bounds propagation.
pub const HINT_BOUNDS_RAM: u64 = 16;

/// RAM cost of the visibility-count processes.
pub const VISIBILITY_COUNT_RAM: u64 = 40;

/// RAM cost of recording pair implications.
pub const PAIR_IMPLICATIONS_RAM: u64 = 24;

/// RAM cost of following an implication closure.
pub const FOLLOW_IMPLICATIONS_RAM: u64 = 64;

/// RAM cost of the random guesser (holds every undetermined triple).
pub const RANDOM_GUESS_RAM: u64 = 96;

/// RAM cost of whole-grid validation.
pub const VALIDATION_RAM: u64 = 128;
