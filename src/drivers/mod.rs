//! Peripheral drivers and hardware initialisation.

pub mod button;
pub mod buzzer;
pub mod hw_init;
pub mod joystick;
pub mod matrix;
pub mod servo;
