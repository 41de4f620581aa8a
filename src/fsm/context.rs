//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the latest input snapshot, the reservoir, the
//! pending-request flags, per-state session data, output commands and
//! configuration.  Think of it as the "blackboard" in a blackboard
//! architecture.

use heapless::Vec;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::app::events::AppEvent;
use crate::config::SystemConfig;
use crate::drivers::servo::ServoPosition;
use crate::fsm::StateId;
use crate::reservoir::Reservoir;
use crate::ui::screen::{Notice, Screen};

// ---------------------------------------------------------------------------
// Domain enums
// ---------------------------------------------------------------------------

/// How dispense requests are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// Feed-button press requests a dispense.
    #[default]
    Manual,
    /// A repeating timer requests dispenses; the feed button is ignored.
    Automatic,
}

/// Which dose the digit wizard is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseTarget {
    Food,
    Water,
}

/// Origin of a pending dispense request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseSource {
    Button,
    Timer,
}

// ---------------------------------------------------------------------------
// Input snapshot (written by the service before each tick)
// ---------------------------------------------------------------------------

/// Raw joystick samples plus the debounced confirm edge for this tick.
///
/// Axis samples stay raw so each state can apply its own dead zone (wide
/// for navigation, narrow for timer adjustment).
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    /// Raw X-axis ADC sample (0–4095, center ≈ 2047).
    pub joy_x: u16,
    /// Raw Y-axis ADC sample (0–4095, center ≈ 2047).
    pub joy_y: u16,
    /// True exactly once per accepted confirm-button edge.
    pub confirm: bool,
}

// ---------------------------------------------------------------------------
// Per-state session data
// ---------------------------------------------------------------------------

/// Number of entries in the main menu.
pub const MENU_OPTION_COUNT: u8 = 4;

/// Ephemeral menu navigation state; reset when the menu is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuState {
    /// Highlighted entry, in `[0, MENU_OPTION_COUNT)`.
    pub selected: u8,
    /// Ticks until the next navigation tilt is honoured.
    pub nav_cooldown: u8,
}

/// Live digit-entry wizard session.
#[derive(Debug, Clone, Copy)]
pub struct DigitEntrySession {
    pub target: DoseTarget,
    /// Hundreds, tens, units.
    pub digits: [u8; 3],
    /// Caret position, in `[0, 3)`.
    pub cursor: u8,
    pub cursor_cooldown: u8,
    pub adjust_cooldown: u8,
}

impl DigitEntrySession {
    pub fn new(target: DoseTarget) -> Self {
        Self {
            target,
            digits: [0; 3],
            cursor: 0,
            cursor_cooldown: 0,
            adjust_cooldown: 0,
        }
    }

    /// The numeric value currently shown by the three digits.
    pub fn value(&self) -> u32 {
        u32::from(self.digits[0]) * 100 + u32::from(self.digits[1]) * 10 + u32::from(self.digits[2])
    }
}

impl Default for DigitEntrySession {
    fn default() -> Self {
        Self::new(DoseTarget::Food)
    }
}

/// Timer-period adjustment session.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerSetupState {
    pub period_ms: u32,
    pub adjust_cooldown: u8,
}

/// Phases of an in-flight dispense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispensePhase {
    #[default]
    Announce,
    Food,
    Water,
    Settle,
}

/// Progress bookkeeping for the Dispensing state.
#[derive(Debug, Clone, Copy)]
pub struct DispenseProgress {
    pub source: DispenseSource,
    pub phase: DispensePhase,
    /// Dose targets captured at entry (settings may change mid-flight).
    pub food_dose: i32,
    pub water_dose: i32,
    pub food_drained: i32,
    pub water_drained: i32,
    /// Set when the reservoir refused the request; next update bails out.
    pub refused: bool,
}

impl Default for DispenseProgress {
    fn default() -> Self {
        Self {
            source: DispenseSource::Button,
            phase: DispensePhase::Announce,
            food_dose: 0,
            water_dose: 0,
            food_drained: 0,
            water_drained: 0,
            refused: false,
        }
    }
}

/// Tick-counted software timer for automatic dispensing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoFeedTimer {
    pub armed: bool,
    pub period_ticks: u32,
    pub elapsed: u32,
}

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request output actions.
/// The service applies these to the actual ports after each tick.
#[derive(Debug, Clone, Copy)]
pub struct OutputCommands {
    pub servo: ServoPosition,
    /// Tone to play this tick, if any.  Cleared by the service each tick.
    pub tone: Option<crate::drivers::buzzer::ToneId>,
    pub screen: Screen,
}

impl Default for OutputCommands {
    fn default() -> Self {
        Self {
            servo: ServoPosition::Rest,
            tone: None,
            screen: Screen::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// Maximum app events a single tick can emit.
pub const OUTBOX_CAP: usize = 8;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Domain --
    pub config: SystemConfig,
    pub reservoir: Reservoir,
    pub mode: OperatingMode,

    // -- Inputs --
    /// Latest input readings.  Updated by the service before each tick.
    pub inputs: InputSnapshot,
    /// Menu-button edge observed; consumed at the top of the Idle update.
    pub menu_requested: bool,
    /// Single-flight dispense request; cleared when Dispensing exits.
    pub dispense_pending: Option<DispenseSource>,

    // -- Per-state sessions --
    pub menu: MenuState,
    pub entry: DigitEntrySession,
    pub timer_setup: TimerSetupState,
    pub dispense: DispenseProgress,
    /// Where Dispensing returns once the sequence finishes.
    pub return_to: StateId,
    /// Transient message holding the display, with remaining ticks.
    pub notice: Option<(Notice, u32)>,

    // -- Automatic mode --
    pub auto_timer: AutoFeedTimer,

    // -- Outputs --
    pub commands: OutputCommands,
    /// App events emitted this tick; drained by the service.
    pub outbox: Vec<AppEvent, OUTBOX_CAP>,

    /// Seeded PRNG for the simulated drain steps.
    pub rng: SmallRng,
}

impl FsmContext {
    /// Create a new context with the given configuration and RNG seed.
    pub fn new(config: SystemConfig, rng_seed: u64) -> Self {
        let reservoir = Reservoir::full(config.food_capacity_g, config.water_capacity_ml);
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            config,
            reservoir,
            mode: OperatingMode::Manual,
            inputs: InputSnapshot::default(),
            menu_requested: false,
            dispense_pending: None,
            menu: MenuState::default(),
            entry: DigitEntrySession::default(),
            timer_setup: TimerSetupState::default(),
            dispense: DispenseProgress::default(),
            return_to: StateId::Idle,
            notice: None,
            auto_timer: AutoFeedTimer::default(),
            commands: OutputCommands::default(),
            outbox: Vec::new(),
            rng: SmallRng::seed_from_u64(rng_seed),
        }
    }

    /// Convert a millisecond duration to whole control-loop ticks (≥ 1).
    pub fn ticks_of(&self, ms: u32) -> u32 {
        (ms / self.config.control_loop_interval_ms).max(1)
    }

    /// Post a transient notice that holds the display for its duration.
    pub fn set_notice(&mut self, notice: Notice) {
        let ticks = self.ticks_of(notice.hold_ms(&self.config));
        self.notice = Some((notice, ticks));
    }

    /// Emit an app event.  Overflow drops the event (bounded outbox).
    pub fn emit(&mut self, event: AppEvent) {
        let _ = self.outbox.push(event);
    }

    /// Arm (or re-arm) the automatic timer at the configured period.
    pub fn arm_auto_timer(&mut self) {
        self.auto_timer = AutoFeedTimer {
            armed: true,
            period_ticks: self.ticks_of(self.config.auto_period_ms),
            elapsed: 0,
        };
        self.emit(AppEvent::AutoTimerArmed {
            period_ms: self.config.auto_period_ms,
        });
    }

    /// Disarm the automatic timer.
    pub fn disarm_auto_timer(&mut self) {
        self.auto_timer.armed = false;
        self.auto_timer.elapsed = 0;
        self.emit(AppEvent::AutoTimerDisarmed);
    }
}
