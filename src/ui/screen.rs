//! Screen model: what the display should show, independent of how.
//!
//! State handlers write a [`Screen`] value into the output commands;
//! the renderer turns it into draw calls at the port boundary.

use crate::config::SystemConfig;
use crate::error::DispenseError;
use crate::fsm::context::{DoseTarget, OperatingMode};

/// Hold time for the refill acknowledgement, shorter than other notices.
pub const REFILL_HOLD_MS: u32 = 2_000;

/// Transient message that owns the display for a fixed hold time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Both reservoirs reset to capacity.
    Refilled,
    /// Mode switched back to manual, timer disarmed.
    ModeManual,
    /// A dose was committed by the digit wizard.
    DoseSaved { target: DoseTarget, value: u32 },
    /// Dispense refused; names the lacking resource.
    Insufficient(DispenseError),
}

impl Notice {
    /// How long the notice holds the display.
    pub fn hold_ms(&self, config: &SystemConfig) -> u32 {
        match self {
            Self::Refilled => REFILL_HOLD_MS,
            _ => config.notice_hold_ms,
        }
    }
}

/// One full frame of display content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Idle status: levels, mode, key hints, alternating border.
    Status {
        food_g: i32,
        water_ml: i32,
        mode: OperatingMode,
        border: bool,
    },
    /// Main menu with the highlighted entry.
    Menu { selected: u8 },
    /// Digit wizard: three digits plus caret.
    DigitEntry {
        target: DoseTarget,
        digits: [u8; 3],
        cursor: u8,
    },
    /// Automatic-timer period adjustment.
    TimerSetup { period_ms: u32 },
    /// Dispense in progress for the named resource.
    Dispensing { target: DoseTarget },
    /// Transient message.
    Notice(Notice),
}

impl Default for Screen {
    fn default() -> Self {
        Self::Status {
            food_g: 0,
            water_ml: 0,
            mode: OperatingMode::Manual,
            border: false,
        }
    }
}

/// The four main-menu labels, in display order.
pub const MENU_LABELS: [&str; 4] = ["Modo", "Doses", "Encher", "Voltar"];
