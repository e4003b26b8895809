//! # towers
//!
//! The terminal front end of the Towers engine: configuration, seed files,
//! the autopilot that keeps the CPU busy, and plain-text rendering.

pub mod autopilot;
pub mod cli;
pub mod config;
pub mod render;
pub mod seed;

pub use autopilot::{Autopilot, Report, Stats, Verdict};
pub use config::{AutopilotConfig, DisplayConfig, Overrides, TowersConfig};
