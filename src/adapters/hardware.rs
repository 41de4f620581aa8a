//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the joystick reader, confirm button and all actuator drivers,
//! exposing them through [`InputPort`], [`ActuatorPort`] and
//! [`IndicatorPort`].  This is the only module besides the display
//! adapter that touches actual hardware.  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, IndicatorPort, InputPort};
use crate::drivers::button::{ButtonId, DebouncedButton};
use crate::drivers::buzzer::{BuzzerDriver, ToneId};
use crate::drivers::joystick::{Axis, JoystickReader};
use crate::drivers::matrix::MatrixDriver;
use crate::drivers::servo::{ServoDriver, ServoPosition};
use crate::pins::MATRIX_PIXELS;

/// Concrete adapter that combines all feeder hardware behind port traits.
pub struct HardwareAdapter {
    joystick: JoystickReader,
    confirm: DebouncedButton,
    servo: ServoDriver,
    buzzer: BuzzerDriver,
    matrix: MatrixDriver,
}

impl HardwareAdapter {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            joystick: JoystickReader::new(),
            confirm: DebouncedButton::new(ButtonId::Confirm, debounce_ms),
            servo: ServoDriver::new(),
            buzzer: BuzzerDriver::new(),
            matrix: MatrixDriver::new(),
        }
    }

    /// Park the servo at rest (shutdown path).
    pub fn park(&mut self) {
        self.servo.park();
    }
}

// ── InputPort implementation ──────────────────────────────────

impl InputPort for HardwareAdapter {
    fn read_joystick(&mut self) -> (u16, u16) {
        (
            self.joystick.read_axis(Axis::X),
            self.joystick.read_axis(Axis::Y),
        )
    }

    fn confirm_pressed(&mut self) -> bool {
        self.confirm.poll()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_servo(&mut self, position: ServoPosition) {
        self.servo.set(position);
    }

    fn play_tone(&mut self, tone: ToneId) {
        self.buzzer.play(tone);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn write_frame(&mut self, frame: &[u32; MATRIX_PIXELS]) {
        self.matrix.write(frame);
    }
}
