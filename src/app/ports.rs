//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (input hardware, actuators, display, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole service runs under test with mock adapters.

use crate::drivers::buzzer::ToneId;
use crate::drivers::servo::ServoPosition;
use crate::pins::MATRIX_PIXELS;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to sample the joystick.
pub trait InputPort {
    /// Raw (x, y) axis samples, 0–4095 with center ≈ 2047.
    fn read_joystick(&mut self) -> (u16, u16);

    /// Debounced confirm-button edge: true exactly once per accepted press.
    fn confirm_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: servo positioning and tone playback.
pub trait ActuatorPort {
    /// Move the servo to a calibrated position.  Idempotent.
    fn set_servo(&mut self, position: ServoPosition);

    /// Play a tone sequence.  Blocking for its total duration.
    fn play_tone(&mut self, tone: ToneId);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → framebuffer)
// ───────────────────────────────────────────────────────────────

/// Monochrome 128×64-class framebuffer operations.
///
/// Draw failures are swallowed inside the adapter (logged, never
/// propagated) — a dropped frame is preferable to a halted feeder.
pub trait DisplayPort {
    fn clear(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32);
    /// Push the frame to the panel.
    fn present(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED matrix)
// ───────────────────────────────────────────────────────────────

/// 5×5 addressable level-indicator grid, refreshed once per tick.
pub trait IndicatorPort {
    /// Write a full 25-pixel frame of packed GRB colour words.
    fn write_frame(&mut self, frame: &[u32; MATRIX_PIXELS]);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log in
/// production, a collecting vec under test).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
