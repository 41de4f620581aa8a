//! Joystick ADC reader and dead-zone tilt classification.
//!
//! Two analog axes, 12-bit samples resting near mid-rail (≈2047).  A tilt
//! only registers once the sample leaves a dead zone around the centre;
//! the zone is wide (±500) for menu navigation and narrow (±200) for
//! continuous value adjustment.  Both thresholds are deliberate: wide keeps
//! menu scrolling calm, narrow keeps numeric entry responsive.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC1 channels wired to the stick.
//! On host/test: returns the neutral centre value.

use crate::drivers::hw_init;
use crate::pins;

/// Joystick axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal — digit cursor movement.
    X,
    /// Vertical — menu navigation and value adjustment.
    Y,
}

/// Direction of a classified tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    /// Below centre minus the dead zone.
    Neg,
    /// Inside the dead zone.
    Center,
    /// Above centre plus the dead zone.
    Pos,
}

/// Classify a raw axis sample against a centre value and dead zone.
pub fn classify(raw: u16, center: u16, dead_zone: u16) -> Tilt {
    if raw < center.saturating_sub(dead_zone) {
        Tilt::Neg
    } else if raw > center.saturating_add(dead_zone) {
        Tilt::Pos
    } else {
        Tilt::Center
    }
}

/// Reads the two joystick axes.
pub struct JoystickReader;

impl JoystickReader {
    pub fn new() -> Self {
        Self
    }

    /// Raw 12-bit sample for the given axis.
    pub fn read_axis(&mut self, axis: Axis) -> u16 {
        let gpio = match axis {
            Axis::X => pins::JOY_X_ADC_GPIO,
            Axis::Y => pins::JOY_Y_ADC_GPIO,
        };
        hw_init::adc_read_raw(gpio)
    }
}
