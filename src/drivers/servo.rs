//! Dispenser servo driver.
//!
//! One continuous-rotation servo gates both hoppers: one end position
//! releases food, the other releases water, and a rest position closes
//! both.  Positions are PWM duty levels on a 20000-count, 50 Hz frame.
//!
//! ## Safety contract
//!
//! The servo must only leave the rest position during a dispense sequence.
//! Enforced by the FSM; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

/// Dispenser gate positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServoPosition {
    /// Both gates closed.
    #[default]
    Rest,
    /// Food hopper open.
    ReleaseFood,
    /// Water valve open.
    ReleaseWater,
}

impl ServoPosition {
    /// PWM duty level (on the 20000-count frame) for this position.
    pub const fn duty(self) -> u32 {
        match self {
            Self::Rest => 2400,
            Self::ReleaseFood => 1450,
            Self::ReleaseWater => 500,
        }
    }
}

pub struct ServoDriver {
    position: ServoPosition,
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            position: ServoPosition::Rest,
        }
    }

    /// Move to `position`.  No-op when already there.
    pub fn set(&mut self, position: ServoPosition) {
        if position == self.position {
            return;
        }
        hw_init::ledc_set_servo(position.duty());
        self.position = position;
    }

    /// Drive the rest position unconditionally (startup).
    pub fn park(&mut self) {
        hw_init::ledc_set_servo(ServoPosition::Rest.duty());
        self.position = ServoPosition::Rest;
    }

    pub fn position(&self) -> ServoPosition {
        self.position
    }
}
