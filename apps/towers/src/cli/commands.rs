//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::autopilot::{self, Autopilot};
use crate::config::TowersConfig;
use crate::render;
use crate::seed::{load_grid, load_puzzle};
use std::path::Path;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use towers_core::TowersError;

/// Wall-clock time between two clock frames in `run` mode.
const FRAME: Duration = Duration::from_millis(50);

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, TowersError> {
    serde_json::to_string_pretty(value).map_err(|e| TowersError::SerializationError(e.to_string()))
}

fn print_report(
    autopilot: &Autopilot,
    config: &TowersConfig,
    json_mode: bool,
) -> Result<(), TowersError> {
    if json_mode {
        println!("{}", to_json(&autopilot.report())?);
        return Ok(());
    }

    let stats = autopilot.stats();
    print!(
        "{}",
        render::grid(autopilot.puzzle(), config.display.show_candidates)
    );
    println!();
    match autopilot.verdict() {
        Some(verdict) => println!("Result:     {}", verdict),
        None => println!("Result:     still running"),
    }
    println!("Puzzle:     {}", render::puzzle_status(autopilot.puzzle()));
    println!("Pulses:     {}", autopilot.scheduler().pulse_count());
    println!("Rounds:     {}", stats.rounds);
    println!(
        "Processes:  {} submitted, {} completed",
        stats.submitted, stats.completed
    );
    println!(
        "Search:     {} guesses, {} backtracks, {} contradictions",
        stats.guesses, stats.backtracks, stats.contradictions
    );
    Ok(())
}

// =============================================================================
// SOLVE COMMAND
// =============================================================================

/// Run the autopilot without waiting for the clock.
pub fn cmd_solve(config: &TowersConfig, seed: &Path, json_mode: bool) -> Result<(), TowersError> {
    let puzzle = load_puzzle(seed)?;
    tracing::info!("Solving {} ({}x{})", seed.display(), puzzle.size(), puzzle.size());

    let mut autopilot = Autopilot::new(puzzle, config);
    autopilot.solve();
    print_report(&autopilot, config, json_mode)
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Run the autopilot against the wall clock until it finishes or Ctrl-C.
pub async fn cmd_run(
    config: &TowersConfig,
    seed: &Path,
    json_mode: bool,
    status_secs: u64,
) -> Result<(), TowersError> {
    let puzzle = load_puzzle(seed)?;
    let mut autopilot = Autopilot::new(puzzle, config);

    if !json_mode {
        println!(
            "Running {} at {} pulses/s x {}% on {} cores, {} RAM (Ctrl-C to stop)",
            seed.display(),
            config.scheduler.pulses_per_second,
            config.scheduler.speed_percent,
            config.scheduler.cores,
            config.scheduler.ram
        );
    }

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let status_every = Duration::from_secs(status_secs.max(1));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_frame = Instant::now();
    let mut last_status = last_frame;
    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                let finished = autopilot.advance(now.duration_since(last_frame));
                last_frame = now;

                if !json_mode && now.duration_since(last_status) >= status_every {
                    last_status = now;
                    println!("{}", render::puzzle_status(autopilot.puzzle()));
                    print!("{}", render::scheduler_status(autopilot.scheduler()));
                }
                if finished {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping the CPU");
                autopilot.stop();
                break;
            }
        }
    }

    if !json_mode {
        println!();
    }
    print_report(&autopilot, config, json_mode)
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Fill the seed's grid from a file and run the validator on it.
pub fn cmd_validate(
    config: &TowersConfig,
    seed: &Path,
    grid: &Path,
    json_mode: bool,
) -> Result<(), TowersError> {
    let mut puzzle = load_puzzle(seed)?;
    let values = load_grid(grid, puzzle.size())?;
    for (row, line) in values.iter().enumerate() {
        for (col, &val) in line.iter().enumerate() {
            puzzle.set_cell(row, col, val)?;
        }
    }

    let (valid, log) = autopilot::validate(&mut puzzle, &config.scheduler).ok_or_else(|| {
        TowersError::Config(format!(
            "the validator does not fit in {} RAM",
            config.scheduler.ram
        ))
    })?;

    if json_mode {
        let output = serde_json::json!({
            "valid": valid,
            "log": log,
        });
        println!("{}", to_json(&output)?);
    } else {
        for line in &log {
            println!("  {}", line);
        }
        println!();
        println!("Valid: {}", if valid { "yes" } else { "no" });
    }
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print a seed's grid with its hints.
pub fn cmd_show(config: &TowersConfig, seed: &Path, json_mode: bool) -> Result<(), TowersError> {
    let puzzle = load_puzzle(seed)?;

    if json_mode {
        println!("{}", to_json(puzzle.seed())?);
    } else {
        print!(
            "{}",
            render::grid(&puzzle, config.display.show_candidates)
        );
        println!();
        println!("{}", render::puzzle_status(&puzzle));
    }
    Ok(())
}
