//! # Towers CLI Module
//!
//! ## Available Commands
//!
//! - `solve` - Run the autopilot as fast as possible
//! - `run` - Run the autopilot in real time (Ctrl-C to stop)
//! - `validate` - Check a filled grid against a seed
//! - `show` - Print a seed's grid and hints

mod commands;

use crate::config::{Overrides, TowersConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use towers_core::TowersError;

pub use commands::*;

/// Seed used when a command is given none.
pub const DEFAULT_SEED: &str = "demos/four_by_four.json";

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Towers - an idle CPU that solves skyscraper puzzles
///
/// A handful of cores and a RAM budget run small inference processes,
/// one tick at a time, until the grid is solved.
#[derive(Parser, Debug)]
#[command(name = "towers")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to towers.toml (defaults to ./towers.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of cores
    #[arg(long, global = true)]
    pub cores: Option<usize>,

    /// RAM capacity
    #[arg(long, global = true)]
    pub ram: Option<u64>,

    /// Clock speed in percent
    #[arg(long, global = true)]
    pub speed: Option<u64>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a puzzle as fast as possible
    Solve {
        /// Path to the puzzle seed (JSON)
        #[arg(short, long, default_value = DEFAULT_SEED)]
        seed: PathBuf,
    },

    /// Solve a puzzle in real time
    Run {
        /// Path to the puzzle seed (JSON)
        #[arg(short, long, default_value = DEFAULT_SEED)]
        seed: PathBuf,

        /// Seconds between status lines
        #[arg(short, long, default_value = "1")]
        interval: u64,
    },

    /// Validate a filled grid against a seed
    Validate {
        /// Path to the puzzle seed (JSON)
        #[arg(short, long, default_value = DEFAULT_SEED)]
        seed: PathBuf,

        /// Path to the grid (JSON array of rows of one-based heights)
        #[arg(short, long)]
        grid: PathBuf,
    },

    /// Show a seed's grid and hints
    Show {
        /// Path to the puzzle seed (JSON)
        #[arg(short, long, default_value = DEFAULT_SEED)]
        seed: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// The configuration file with this invocation's flags applied.
    pub fn load_config(&self) -> Result<TowersConfig, TowersError> {
        TowersConfig::load(self.config.as_deref())?.with_overrides(&Overrides {
            cores: self.cores,
            ram: self.ram,
            speed_percent: self.speed,
        })
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TowersError> {
    let config = cli.load_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Solve { seed }) => cmd_solve(&config, &seed, json_mode),
        Some(Commands::Run { seed, interval }) => {
            cmd_run(&config, &seed, json_mode, interval).await
        }
        Some(Commands::Validate { seed, grid }) => cmd_validate(&config, &seed, &grid, json_mode),
        Some(Commands::Show { seed }) => cmd_show(&config, &seed, json_mode),
        None => {
            // No subcommand - show the demo
            cmd_show(&config, &PathBuf::from(DEFAULT_SEED), json_mode)
        }
    }
}
