//! # Pulse Clock
//!
//! Converts elapsed wall-clock time into a whole number of scheduler
//! pulses. The remainder is carried as micro-pulses so that slow frame
//! rates and fractional speeds still add up to the right pulse count.

use crate::primitives::{DEFAULT_PULSES_PER_SECOND, DEFAULT_SPEED_PERCENT, MICROS_PER_PULSE_UNIT};
use std::time::Duration;

/// Integer-only pulse accumulator.
#[derive(Debug, Clone)]
pub struct PulseClock {
    pulses_per_second: u64,
    speed_percent: u64,
    /// Accumulated pulse fraction, in `1 / (MICROS_PER_PULSE_UNIT * 100)` pulses.
    carry: u128,
}

impl Default for PulseClock {
    fn default() -> Self {
        Self::new(DEFAULT_PULSES_PER_SECOND, DEFAULT_SPEED_PERCENT)
    }
}

impl PulseClock {
    /// Create a clock running at `pulses_per_second * speed_percent / 100`.
    #[must_use]
    pub fn new(pulses_per_second: u64, speed_percent: u64) -> Self {
        Self {
            pulses_per_second,
            speed_percent,
            carry: 0,
        }
    }

    /// Change the speed multiplier. Accumulated time is kept.
    pub fn set_speed_percent(&mut self, speed_percent: u64) {
        self.speed_percent = speed_percent;
    }

    /// Current speed multiplier in percent.
    #[must_use]
    pub fn speed_percent(&self) -> u64 {
        self.speed_percent
    }

    /// Base pulse rate at 100% speed.
    #[must_use]
    pub fn pulses_per_second(&self) -> u64 {
        self.pulses_per_second
    }

    /// Number of whole pulses owed for `elapsed`.
    pub fn pulses_for(&mut self, elapsed: Duration) -> u64 {
        let unit = u128::from(MICROS_PER_PULSE_UNIT).saturating_mul(100);
        let owed = elapsed
            .as_micros()
            .saturating_mul(u128::from(self.pulses_per_second))
            .saturating_mul(u128::from(self.speed_percent));

        self.carry = self.carry.saturating_add(owed);
        let whole = self.carry / unit;
        self.carry %= unit;
        u64::try_from(whole).unwrap_or(u64::MAX)
    }
}
