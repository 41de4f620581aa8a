//! Structured application events emitted by the core.
//!
//! Events flow out through the [`EventSink`](crate::app::ports::EventSink)
//! port; on target they become serial log lines, in tests they are
//! collected and asserted on.

use crate::error::DispenseError;
use crate::fsm::context::{DispenseSource, DoseTarget, OperatingMode};
use crate::fsm::StateId;

/// Periodic snapshot of the system for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub state: StateId,
    pub mode: OperatingMode,
    pub food_g: i32,
    pub water_ml: i32,
    pub auto_period_ms: u32,
    pub auto_armed: bool,
}

/// Everything observable the application does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Firmware finished bring-up and entered the main loop.
    Started,
    /// The FSM moved between states.
    StateChanged { from: StateId, to: StateId },
    /// Operating mode flipped.
    ModeChanged(OperatingMode),
    /// The repeating dispense timer was (re)armed.
    AutoTimerArmed { period_ms: u32 },
    /// The repeating dispense timer was disarmed.
    AutoTimerDisarmed,
    /// The digit wizard committed a dose.
    DoseCommitted { target: DoseTarget, value: u32 },
    /// Both reservoirs were reset to capacity.
    Refilled,
    /// A dispense sequence began.
    DispenseStarted { source: DispenseSource },
    /// A dispense sequence finished; amounts actually drained.
    DispenseCompleted { food_g: i32, water_ml: i32 },
    /// A dispense request was refused.
    DispenseRefused(DispenseError),
    /// Periodic snapshot.
    Telemetry(TelemetrySnapshot),
}
