//! Piezo buzzer driver and the feeder's tone vocabulary.
//!
//! Tones are square waves bit-banged on a GPIO: half-period high, half
//! low, for the requested duration.  Sequences are short (two notes with a
//! 50 ms gap) and play synchronously on the main loop — input servicing
//! pauses for their duration, an accepted trade-off for this device.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: toggles the GPIO with microsecond delays.
//! On host/test: records the last sequence played.

use crate::drivers::hw_init;
use crate::pins;

/// A single square-wave note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub freq_hz: u32,
    pub duration_ms: u32,
}

/// Pause between the notes of a sequence.
const NOTE_GAP_MS: u32 = 50;

/// The feeder's fixed tone sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneId {
    /// Power-on chime.
    Startup,
    /// Dispense confirmation.
    Confirm,
    /// Refused dispense / alert.
    Alert,
}

impl ToneId {
    /// The two-note sequence for this tone.
    pub const fn sequence(self) -> [Tone; 2] {
        match self {
            Self::Startup => [
                Tone { freq_hz: 523, duration_ms: 100 },
                Tone { freq_hz: 880, duration_ms: 200 },
            ],
            Self::Confirm => [
                Tone { freq_hz: 220, duration_ms: 200 },
                Tone { freq_hz: 392, duration_ms: 300 },
            ],
            Self::Alert => [
                Tone { freq_hz: 262, duration_ms: 150 },
                Tone { freq_hz: 262, duration_ms: 200 },
            ],
        }
    }
}

pub struct BuzzerDriver {
    last_played: Option<ToneId>,
}

impl BuzzerDriver {
    pub fn new() -> Self {
        Self { last_played: None }
    }

    /// Play a tone sequence to completion (blocking).
    pub fn play(&mut self, id: ToneId) {
        for tone in id.sequence() {
            self.play_tone(tone);
            hw_init::delay_ms(NOTE_GAP_MS);
        }
        self.last_played = Some(id);
    }

    /// Most recent sequence played (simulation/test introspection).
    pub fn last_played(&self) -> Option<ToneId> {
        self.last_played
    }

    #[cfg(target_os = "espidf")]
    fn play_tone(&mut self, tone: Tone) {
        let half_period_us = 500_000 / tone.freq_hz;
        let cycles = tone.duration_ms * 1000 / (half_period_us * 2);
        for _ in 0..cycles {
            hw_init::gpio_write(pins::BUZZER_GPIO, true);
            hw_init::delay_us(half_period_us);
            hw_init::gpio_write(pins::BUZZER_GPIO, false);
            hw_init::delay_us(half_period_us);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn play_tone(&mut self, tone: Tone) {
        // Simulation: no audible output, no real delay.
        let _ = (tone, pins::BUZZER_GPIO);
    }
}
