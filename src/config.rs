//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder system: dose defaults and
//! limits, joystick thresholds, debounce windows and loop pacing.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Reservoirs ---
    /// Food reservoir capacity (grams).
    pub food_capacity_g: i32,
    /// Water reservoir capacity (millilitres).
    pub water_capacity_ml: i32,

    // --- Doses ---
    /// Food released per dispense (grams). Committed values are 1–500.
    pub food_dose_g: i32,
    /// Water released per dispense (millilitres). Committed values are 1–500.
    pub water_dose_ml: i32,
    /// Upper bound for a committed dose.
    pub dose_max: i32,

    // --- Automatic mode ---
    /// Repeating-timer period for automatic dispensing (milliseconds).
    pub auto_period_ms: u32,
    /// Lower clamp for the automatic period.
    pub auto_period_min_ms: u32,
    /// Upper clamp for the automatic period.
    pub auto_period_max_ms: u32,
    /// Adjustment step in the timer-setup screen.
    pub auto_period_step_ms: u32,

    // --- Joystick ---
    /// ADC value of an axis at rest (12-bit, mid-rail).
    pub joy_center: u16,
    /// Dead zone for menu/digit navigation (wide — avoids over-scrolling).
    pub nav_dead_zone: u16,
    /// Dead zone for continuous value adjustment (narrow — stays responsive).
    pub adjust_dead_zone: u16,

    // --- Input pacing ---
    /// Accepted-edge debounce window for every button (milliseconds).
    pub debounce_ms: u32,
    /// Settle time after a cursor move in the digit wizard.
    pub cursor_settle_ms: u32,
    /// Settle time after a digit increment/decrement.
    pub digit_settle_ms: u32,
    /// Settle time for menu navigation and timer adjustment.
    pub nav_settle_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// How long transient notices own the display (milliseconds).
    pub notice_hold_ms: u32,
    /// Pacing of the simulated drain during a dispense (milliseconds/step).
    pub dispense_step_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Reservoirs
            food_capacity_g: 1000,
            water_capacity_ml: 1000,

            // Doses
            food_dose_g: 50,
            water_dose_ml: 30,
            dose_max: 500,

            // Automatic mode
            auto_period_ms: 5000,
            auto_period_min_ms: 1000,
            auto_period_max_ms: 23_000,
            auto_period_step_ms: 1000,

            // Joystick (12-bit ADC, centred)
            joy_center: 2047,
            nav_dead_zone: 500,
            adjust_dead_zone: 200,

            // Input pacing
            debounce_ms: 200,
            cursor_settle_ms: 100,
            digit_settle_ms: 150,
            nav_settle_ms: 300,

            // Timing
            control_loop_interval_ms: 50, // 20 Hz
            notice_hold_ms: 3000,
            dispense_step_ms: 100,
            telemetry_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Default food dose applied when the wizard commits zero.
    pub fn default_food_dose(&self) -> i32 {
        50
    }

    /// Default water dose applied when the wizard commits zero.
    pub fn default_water_dose(&self) -> i32 {
        30
    }

    /// Check the invariants the control loop and wizard rely on.
    ///
    /// Runtime config updates must pass this gate before they replace the
    /// live configuration.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control loop interval must be > 0"));
        }
        if self.food_capacity_g <= 0 || self.water_capacity_ml <= 0 {
            return Err(Error::Config("reservoir capacities must be positive"));
        }
        if self.dose_max <= 0 {
            return Err(Error::Config("dose_max must be positive"));
        }
        if !(1..=self.dose_max).contains(&self.food_dose_g)
            || !(1..=self.dose_max).contains(&self.water_dose_ml)
        {
            return Err(Error::Config("doses must lie in [1, dose_max]"));
        }
        if self.auto_period_min_ms > self.auto_period_max_ms
            || !(self.auto_period_min_ms..=self.auto_period_max_ms).contains(&self.auto_period_ms)
        {
            return Err(Error::Config("auto period outside [min, max]"));
        }
        Ok(())
    }
}
