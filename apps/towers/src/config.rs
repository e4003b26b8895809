//! # Configuration
//!
//! `towers.toml` loading. Every section and field is optional; a missing
//! file means defaults everywhere. CLI flags are layered on top with
//! [`TowersConfig::with_overrides`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use towers_core::{SchedulerConfig, TowersError};

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "towers.toml";

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Whole application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TowersConfig {
    /// Shape of the simulated computer.
    pub scheduler: SchedulerConfig,

    /// What the autopilot is allowed to do.
    pub autopilot: AutopilotConfig,

    /// Terminal output.
    pub display: DisplayConfig,
}

/// Autopilot behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutopilotConfig {
    /// Submit a random guess when a round makes no progress.
    pub guessing: bool,

    /// Give up after this many pulses. 0 means no limit.
    pub max_pulses: u64,

    /// Submit follow-set processes for newly solved cells.
    pub follow_implications: bool,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            guessing: true,
            max_pulses: 1_000_000,
            follow_implications: true,
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Print candidate sets for unsolved cells instead of dots.
    pub show_candidates: bool,
}

/// CLI values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cores: Option<usize>,
    pub ram: Option<u64>,
    pub speed_percent: Option<u64>,
}

// =============================================================================
// LOADING
// =============================================================================

impl TowersConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, TowersError> {
        let config: Self = toml::from_str(text).map_err(|e| TowersError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    ///
    /// With `path` set, the file must exist. Without it, `towers.toml` in
    /// the working directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, TowersError> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            TowersError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(TowersError::Config(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            TowersError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&text)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply CLI overrides and re-check the result.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, TowersError> {
        if let Some(cores) = overrides.cores {
            self.scheduler.cores = cores;
        }
        if let Some(ram) = overrides.ram {
            self.scheduler.ram = ram;
        }
        if let Some(speed) = overrides.speed_percent {
            self.scheduler.speed_percent = speed;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), TowersError> {
        if self.scheduler.cores == 0 {
            return Err(TowersError::Config("scheduler.cores must be at least 1".into()));
        }
        if self.scheduler.ram == 0 {
            return Err(TowersError::Config("scheduler.ram must be at least 1".into()));
        }
        if self.scheduler.pulses_per_second == 0 {
            return Err(TowersError::Config(
                "scheduler.pulses_per_second must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_default() {
        let config = TowersConfig::from_toml("").expect("parse");
        assert_eq!(config, TowersConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = TowersConfig::from_toml(
            "[scheduler]\ncores = 4\n\n[display]\nshow_candidates = true\n",
        )
        .expect("parse");

        assert_eq!(config.scheduler.cores, 4);
        assert_eq!(config.scheduler.ram, SchedulerConfig::default().ram);
        assert!(config.display.show_candidates);
        assert!(config.autopilot.guessing);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = TowersConfig::from_toml("[autopilot]\nguesing = false\n").expect_err("typo");
        assert!(matches!(err, TowersError::Config(_)));
    }

    #[test]
    fn zero_cores_is_rejected() {
        assert!(TowersConfig::from_toml("[scheduler]\ncores = 0\n").is_err());
        let overrides = Overrides {
            cores: Some(0),
            ..Overrides::default()
        };
        assert!(TowersConfig::default().with_overrides(&overrides).is_err());
    }

    #[test]
    fn overrides_win() {
        let config = TowersConfig::from_toml("[scheduler]\ncores = 4\nram = 500\n").expect("parse");
        let config = config
            .with_overrides(&Overrides {
                cores: Some(1),
                ram: None,
                speed_percent: Some(250),
            })
            .expect("valid");

        assert_eq!(config.scheduler.cores, 1);
        assert_eq!(config.scheduler.ram, 500);
        assert_eq!(config.scheduler.speed_percent, 250);
    }
}
