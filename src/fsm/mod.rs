//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern expressed in Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Idle       │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Menu       │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ DigitEntry │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ TimerSetup │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ Dispensing │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └────────────┴───────────┴──────────┴───────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut FsmContext` which
//! holds inputs, the reservoir, output commands, config, and timing.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all possible UI/operation states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Menu = 1,
    DigitEntry = 2,
    TimerSetup = 3,
    Dispensing = 4,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Menu,
            2 => Self::DigitEntry,
            3 => Self::TimerSetup,
            4 => Self::Dispensing,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter (wraps at u64::MAX).
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (used by the service when a pending
    /// dispense request must interrupt whatever UI state is active).
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer and timing
        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::{DispenseSource, DoseTarget, FsmContext, OperatingMode};
    use super::*;
    use crate::config::SystemConfig;
    use crate::error::DispenseError;
    use crate::ui::screen::{Notice, Screen};

    fn make_ctx() -> FsmContext {
        FsmContext::new(SystemConfig::default(), 42)
    }

    fn make_fsm() -> Fsm {
        Fsm::new(states::build_state_table(), StateId::Idle)
    }

    /// Tilt values well outside the wide dead zone.
    const Y_LOW: u16 = 100;
    const Y_HIGH: u16 = 4000;

    fn press_confirm(fsm: &mut Fsm, ctx: &mut FsmContext) {
        ctx.inputs.confirm = true;
        fsm.tick(ctx);
        ctx.inputs.confirm = false;
    }

    /// Tick until the menu navigation cooldown has drained.
    fn settle(fsm: &mut Fsm, ctx: &mut FsmContext) {
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        for _ in 0..8 {
            fsm.tick(ctx);
        }
    }

    fn open_menu(fsm: &mut Fsm, ctx: &mut FsmContext) {
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        ctx.menu_requested = true;
        fsm.tick(ctx);
        assert_eq!(fsm.current_state(), StateId::Menu);
    }

    #[test]
    fn starts_in_idle() {
        let fsm = make_fsm();
        assert_eq!(fsm.current_state(), StateId::Idle);
    }

    #[test]
    fn tick_increments_counter() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.ticks_in_current_state(), 1);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.ticks_in_current_state(), 2);
    }

    #[test]
    fn idle_renders_status_screen() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        fsm.tick(&mut ctx);
        match ctx.commands.screen {
            Screen::Status {
                food_g, water_ml, ..
            } => {
                assert_eq!(food_g, 1000);
                assert_eq!(water_ml, 1000);
            }
            other => panic!("expected status screen, got {other:?}"),
        }
    }

    #[test]
    fn menu_request_opens_menu() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);
        assert!(!ctx.menu_requested, "flag must be consumed");
        assert_eq!(ctx.menu.selected, 0);
    }

    #[test]
    fn menu_navigation_wraps_and_respects_cooldown() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);

        ctx.inputs.joy_y = Y_LOW; // next
        fsm.tick(&mut ctx);
        assert_eq!(ctx.menu.selected, 1);
        // Held tilt must not advance again within the settle window.
        fsm.tick(&mut ctx);
        assert_eq!(ctx.menu.selected, 1);

        settle(&mut fsm, &mut ctx);
        ctx.inputs.joy_y = Y_HIGH; // previous
        fsm.tick(&mut ctx);
        assert_eq!(ctx.menu.selected, 0);

        settle(&mut fsm, &mut ctx);
        ctx.inputs.joy_y = Y_HIGH; // previous from 0 wraps to 3
        fsm.tick(&mut ctx);
        assert_eq!(ctx.menu.selected, 3);
    }

    #[test]
    fn menu_voltar_returns_to_idle() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);
        ctx.menu.selected = 3;
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(fsm.current_state(), StateId::Idle);
    }

    #[test]
    fn menu_refill_resets_reservoirs() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.reservoir.drain_food(600);
        ctx.reservoir.drain_water(900);
        open_menu(&mut fsm, &mut ctx);
        ctx.menu.selected = 2;
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(ctx.reservoir.food_g(), 1000);
        assert_eq!(ctx.reservoir.water_ml(), 1000);
        assert_eq!(fsm.current_state(), StateId::Menu);
        assert!(matches!(ctx.notice, Some((Notice::Refilled, _))));
    }

    #[test]
    fn mode_toggle_arms_timer_and_enters_setup() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);
        press_confirm(&mut fsm, &mut ctx); // entry 0: toggle mode

        assert_eq!(ctx.mode, OperatingMode::Automatic);
        assert_eq!(fsm.current_state(), StateId::TimerSetup);
        assert!(ctx.auto_timer.armed);
        // Armed at the default 5000 ms period = 100 ticks at 50 ms.
        assert_eq!(ctx.auto_timer.period_ticks, 100);
    }

    #[test]
    fn mode_toggle_back_disarms_timer() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.mode = OperatingMode::Automatic;
        ctx.auto_timer.armed = true;
        open_menu(&mut fsm, &mut ctx);
        press_confirm(&mut fsm, &mut ctx);

        assert_eq!(ctx.mode, OperatingMode::Manual);
        assert!(!ctx.auto_timer.armed);
        assert_eq!(fsm.current_state(), StateId::Menu);
        assert!(matches!(ctx.notice, Some((Notice::ModeManual, _))));
    }

    #[test]
    fn timer_setup_adjusts_in_steps_and_clamps() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::TimerSetup, &mut ctx);
        ctx.timer_setup.period_ms = 5000;
        ctx.inputs.joy_x = ctx.config.joy_center;

        ctx.inputs.joy_y = Y_HIGH; // increment
        fsm.tick(&mut ctx);
        assert_eq!(ctx.timer_setup.period_ms, 6000);
        // Cooldown blocks the immediately following tick.
        fsm.tick(&mut ctx);
        assert_eq!(ctx.timer_setup.period_ms, 6000);

        ctx.timer_setup.period_ms = 23_000;
        settle(&mut fsm, &mut ctx);
        ctx.inputs.joy_y = Y_HIGH;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.timer_setup.period_ms, 23_000, "clamped at the maximum");

        ctx.timer_setup.period_ms = 1000;
        settle(&mut fsm, &mut ctx);
        ctx.inputs.joy_y = Y_LOW;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.timer_setup.period_ms, 1000, "clamped at the minimum");
    }

    #[test]
    fn timer_setup_confirm_rearms_and_returns_to_menu() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::TimerSetup, &mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        ctx.timer_setup.period_ms = 7000;

        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(fsm.current_state(), StateId::Menu);
        assert_eq!(ctx.config.auto_period_ms, 7000);
        assert!(ctx.auto_timer.armed);
        assert_eq!(ctx.auto_timer.period_ticks, 140);
    }

    #[test]
    fn digit_entry_starts_on_food_with_cleared_buffer() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);
        ctx.menu.selected = 1;
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(fsm.current_state(), StateId::DigitEntry);
        assert_eq!(ctx.entry.target, DoseTarget::Food);
        assert_eq!(ctx.entry.digits, [0, 0, 0]);
        assert_eq!(ctx.entry.cursor, 0);
    }

    #[test]
    fn digit_cursor_wraps_both_directions() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::DigitEntry, &mut ctx);
        ctx.inputs.joy_y = ctx.config.joy_center;

        // previous from 0 wraps to 2
        ctx.inputs.joy_x = Y_LOW;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.entry.cursor, 2);

        settle(&mut fsm, &mut ctx);
        // next from 2 wraps to 0
        ctx.inputs.joy_x = Y_HIGH;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.entry.cursor, 0);
    }

    #[test]
    fn first_digit_wraps_modulo_seven() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::DigitEntry, &mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;

        // decrement from 0 on the hundreds position lands on 6, not 9
        ctx.inputs.joy_y = Y_LOW;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.entry.digits[0], 6);

        // the tens position wraps modulo 10
        ctx.entry.cursor = 1;
        settle(&mut fsm, &mut ctx);
        ctx.inputs.joy_y = Y_LOW;
        fsm.tick(&mut ctx);
        assert_eq!(ctx.entry.digits[1], 9);
    }

    #[test]
    fn digit_commit_zero_applies_defaults() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::DigitEntry, &mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;

        press_confirm(&mut fsm, &mut ctx); // food [0,0,0] -> default 50
        assert_eq!(ctx.config.food_dose_g, 50);
        assert_eq!(fsm.current_state(), StateId::DigitEntry);
        assert_eq!(ctx.entry.target, DoseTarget::Water);

        // notice from the food commit must expire before input resumes
        while ctx.notice.is_some() {
            fsm.tick(&mut ctx);
        }

        press_confirm(&mut fsm, &mut ctx); // water [0,0,0] -> default 30
        assert_eq!(ctx.config.water_dose_ml, 30);
        assert_eq!(fsm.current_state(), StateId::Menu);
        assert_eq!(ctx.menu.selected, 0);
    }

    #[test]
    fn digit_commit_clamps_to_500() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::DigitEntry, &mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;

        ctx.entry.digits = [6, 0, 0]; // 600
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(ctx.config.food_dose_g, 500);
    }

    #[test]
    fn digit_commit_plain_value() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(StateId::DigitEntry, &mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;

        ctx.entry.digits = [1, 2, 5];
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(ctx.config.food_dose_g, 125);
    }

    #[test]
    fn dispense_runs_to_completion_and_returns() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;

        ctx.dispense_pending = Some(DispenseSource::Button);
        ctx.return_to = StateId::Idle;
        fsm.force_transition(StateId::Dispensing, &mut ctx);

        let mut guard = 0;
        while fsm.current_state() == StateId::Dispensing {
            fsm.tick(&mut ctx);
            guard += 1;
            assert!(guard < 2000, "dispense never finished");
        }

        assert_eq!(fsm.current_state(), StateId::Idle);
        assert!(ctx.dispense_pending.is_none(), "request slot must free");
        assert!(ctx.reservoir.food_g() < 1000);
        assert!(ctx.reservoir.water_ml() < 1000);
        assert!(ctx.reservoir.food_g() >= 0);
        assert!(ctx.reservoir.water_ml() >= 0);
        assert!(ctx.dispense.food_drained >= ctx.config.food_dose_g);
        assert!(ctx.dispense.water_drained >= ctx.config.water_dose_ml);
    }

    #[test]
    fn dispense_returns_to_interrupted_state() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.inputs.joy_x = ctx.config.joy_center;
        ctx.inputs.joy_y = ctx.config.joy_center;
        open_menu(&mut fsm, &mut ctx);

        ctx.dispense_pending = Some(DispenseSource::Timer);
        ctx.return_to = StateId::Menu;
        fsm.force_transition(StateId::Dispensing, &mut ctx);
        let mut guard = 0;
        while fsm.current_state() == StateId::Dispensing {
            fsm.tick(&mut ctx);
            guard += 1;
            assert!(guard < 2000);
        }
        assert_eq!(fsm.current_state(), StateId::Menu);
    }

    #[test]
    fn dispense_refused_when_food_short() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.reservoir.drain_food(960); // 40 g left, dose 50
        ctx.dispense_pending = Some(DispenseSource::Button);
        ctx.return_to = StateId::Idle;
        fsm.force_transition(StateId::Dispensing, &mut ctx);
        fsm.tick(&mut ctx);

        assert_eq!(fsm.current_state(), StateId::Idle);
        assert_eq!(ctx.reservoir.food_g(), 40, "refusal leaves stock untouched");
        assert!(matches!(
            ctx.notice,
            Some((Notice::Insufficient(DispenseError::InsufficientFood), _))
        ));
    }

    #[test]
    fn notice_swallows_menu_input_until_expiry() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        open_menu(&mut fsm, &mut ctx);
        ctx.set_notice(Notice::ModeManual);

        ctx.menu.selected = 3;
        press_confirm(&mut fsm, &mut ctx);
        assert_eq!(
            fsm.current_state(),
            StateId::Menu,
            "confirm must be ignored while the notice is shown"
        );
    }

    #[test]
    fn state_id_from_index_roundtrip() {
        for i in 0..StateId::COUNT {
            let id = StateId::from_index(i);
            assert_eq!(id as usize, i);
        }
    }
}
