//! # Towers
//!
//! An idle CPU that solves skyscraper puzzles.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   apps/towers (THE BINARY)                 │
//! │                                                            │
//! │  ┌─────────────┐    ┌─────────────┐    ┌───────────────┐   │
//! │  │    CLI      │    │  Autopilot  │    │ Config / Seed │   │
//! │  │   (clap)    │    │   (tokio)   │    │ (toml / json) │   │
//! │  └──────┬──────┘    └──────┬──────┘    └───────┬───────┘   │
//! │         └──────────────────┼───────────────────┘           │
//! │                            ▼                               │
//! │                    ┌───────────────┐                       │
//! │                    │  towers-core  │                       │
//! │                    │  (THE ENGINE) │                       │
//! │                    └───────────────┘                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! towers show --seed demos/four_by_four.json
//! towers solve --seed demos/four_by_four.json --cores 4
//! towers run --speed 400
//! towers validate --seed demos/four_by_four.json --grid demos/four_by_four.solution.json
//! ```

use clap::Parser;
use towers::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // TOWERS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TOWERS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "towers=info,towers_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Towers startup banner.
fn print_banner() {
    println!(
        r#"
   _
  | |_ _____ __ _____ _ _ ___
  |  _/ _ \ V  V / -_) '_(_-<
   \__\___/\_/\_/\___|_| /__/

  Idle skyscraper solver v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
