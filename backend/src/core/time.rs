//! Time management for the simulation
//!
//! The simulation operates in discrete ticks. Each tick stands for a fixed
//! slice of simulated milliseconds; for display the line runs on a
//! compressed clock where one simulated second maps to many "display" hours.

use serde::{Deserialize, Serialize};

/// Hours in one display month
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Display hours per simulated hour
pub const DISPLAY_TIME_SCALE: f64 = 100_000.0;

/// Converts between ticks, simulated milliseconds, and display time
///
/// # Example
/// ```
/// use line_simulator_core_rs::SimClock;
///
/// let clock = SimClock::new(20.0); // 20 ticks per simulated second
/// assert_eq!(clock.ms_per_tick(), 50.0);
/// assert_eq!(clock.display_hours(72_000), 100_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Ticks per simulated second
    ticks_per_second: f64,
}

impl SimClock {
    /// Create a new clock
    ///
    /// # Panics
    /// Panics if `ticks_per_second` is not positive
    pub fn new(ticks_per_second: f64) -> Self {
        assert!(ticks_per_second > 0.0, "ticks_per_second must be positive");
        Self { ticks_per_second }
    }

    /// Ticks per simulated second
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    /// Simulated milliseconds covered by one tick
    pub fn ms_per_tick(&self) -> f64 {
        1000.0 / self.ticks_per_second
    }

    /// Convert a millisecond interval to whole ticks (at least one)
    pub fn ticks_for_ms(&self, ms: f64) -> u64 {
        (ms / self.ms_per_tick()).round().max(1.0) as u64
    }

    /// Display hours elapsed at `tick`
    pub fn display_hours(&self, tick: u64) -> f64 {
        (tick as f64 / (self.ticks_per_second * 3600.0)) * DISPLAY_TIME_SCALE
    }

    /// Display months elapsed at `tick`
    pub fn display_months(&self, tick: u64) -> f64 {
        self.display_hours(tick) / HOURS_PER_MONTH
    }

    /// First tick at which `months` display months have elapsed
    ///
    /// # Example
    /// ```
    /// use line_simulator_core_rs::SimClock;
    ///
    /// let clock = SimClock::new(20.0);
    /// let t = clock.tick_for_display_months(24.0);
    /// assert!(clock.display_months(t) >= 24.0);
    /// assert!(clock.display_months(t - 1) < 24.0);
    /// ```
    pub fn tick_for_display_months(&self, months: f64) -> u64 {
        let exact = months * HOURS_PER_MONTH * (self.ticks_per_second * 3600.0)
            / DISPLAY_TIME_SCALE;
        exact.ceil().max(0.0) as u64
    }
}
