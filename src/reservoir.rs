//! Reservoir model — food and water stock bookkeeping.
//!
//! Pure domain logic: the dispense decision, refills, drain steps and the
//! LED-bar quantisation used by the indicator matrix.  No hardware, no I/O.

use crate::error::DispenseError;

/// Number of LEDs in one indicator bar column.
pub const BAR_LEDS: i32 = 5;

/// Outcome of the dispense decision for a given pair of doses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseOutcome {
    /// Both reservoirs can cover their dose.
    Ok,
    /// Food minus dose would not stay positive.
    InsufficientFood,
    /// Water minus dose would not stay positive.
    InsufficientWater,
}

impl DispenseOutcome {
    /// Convert a refusal into its error; `Ok` has none.
    pub fn err(self) -> Option<DispenseError> {
        match self {
            Self::Ok => None,
            Self::InsufficientFood => Some(DispenseError::InsufficientFood),
            Self::InsufficientWater => Some(DispenseError::InsufficientWater),
        }
    }
}

/// Current stock of both reservoirs.
///
/// Levels live in `[0, capacity]`.  Drain steps clamp at zero, so a
/// completed dispense can never leave a negative level.
#[derive(Debug, Clone, Copy)]
pub struct Reservoir {
    food_g: i32,
    water_ml: i32,
    food_capacity_g: i32,
    water_capacity_ml: i32,
}

impl Reservoir {
    /// A full reservoir pair with the given capacities.
    pub fn full(food_capacity_g: i32, water_capacity_ml: i32) -> Self {
        Self {
            food_g: food_capacity_g,
            water_ml: water_capacity_ml,
            food_capacity_g,
            water_capacity_ml,
        }
    }

    pub fn food_g(&self) -> i32 {
        self.food_g
    }

    pub fn water_ml(&self) -> i32 {
        self.water_ml
    }

    /// Decide whether a dispense of the given doses may run.
    ///
    /// `Ok` iff both `level - dose > 0`.  Food is checked first, so a
    /// request that both reservoirs cannot cover reports insufficient food.
    pub fn dispense_outcome(&self, food_dose_g: i32, water_dose_ml: i32) -> DispenseOutcome {
        if self.food_g - food_dose_g <= 0 {
            DispenseOutcome::InsufficientFood
        } else if self.water_ml - water_dose_ml <= 0 {
            DispenseOutcome::InsufficientWater
        } else {
            DispenseOutcome::Ok
        }
    }

    /// Remove up to `amount` grams of food, clamping at zero.
    /// Returns the amount actually removed.
    pub fn drain_food(&mut self, amount: i32) -> i32 {
        let before = self.food_g;
        self.food_g = (self.food_g - amount).max(0);
        before - self.food_g
    }

    /// Remove up to `amount` millilitres of water, clamping at zero.
    /// Returns the amount actually removed.
    pub fn drain_water(&mut self, amount: i32) -> i32 {
        let before = self.water_ml;
        self.water_ml = (self.water_ml - amount).max(0);
        before - self.water_ml
    }

    /// Reset both reservoirs to capacity.
    pub fn refill(&mut self) {
        self.food_g = self.food_capacity_g;
        self.water_ml = self.water_capacity_ml;
    }

    /// LED counts for the indicator bars: `ceil(level * 5 / capacity)`,
    /// clamped to `[0, 5]`.
    pub fn led_bar_levels(&self) -> (u8, u8) {
        (
            led_count(self.food_g, self.food_capacity_g),
            led_count(self.water_ml, self.water_capacity_ml),
        )
    }
}

/// Quantise a level into a 0–5 LED count (ceiling division).
fn led_count(level: i32, capacity: i32) -> u8 {
    let level = level.clamp(0, capacity);
    let leds = (level * BAR_LEDS + capacity - 1) / capacity;
    leds.clamp(0, BAR_LEDS) as u8
}
