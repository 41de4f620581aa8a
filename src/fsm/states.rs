//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers, no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[menu button]──▶ MENU ──[Doses]──▶ DIGIT_ENTRY(food→water)
//!    ▲                      │  ▲                      │
//!    │                 [Voltar] └────[water saved]────┘
//!    └──────────────────────┘
//!  MENU ──[Modo → automatico]──▶ TIMER_SETUP ──[confirm]──▶ MENU
//!
//!  Any state ──[pending dispense]──▶ DISPENSING ──▶ back to prior state
//! ```
//!
//! Blocking sub-loops of a classic firmware design are expressed as
//! per-state cooldown counters, so every handler returns within one tick.

use log::{debug, info, warn};
use rand::Rng;

use super::context::{
    DigitEntrySession, DispensePhase, DispenseProgress, DoseTarget, FsmContext, MenuState,
    OperatingMode, MENU_OPTION_COUNT,
};
use super::{StateDescriptor, StateId};
use crate::app::events::AppEvent;
use crate::drivers::buzzer::ToneId;
use crate::drivers::joystick::{classify, Tilt};
use crate::drivers::servo::ServoPosition;
use crate::ui::screen::{Notice, Screen};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Menu
        StateDescriptor {
            id: StateId::Menu,
            name: "Menu",
            on_enter: Some(menu_enter),
            on_exit: None,
            on_update: menu_update,
        },
        // Index 2 — DigitEntry
        StateDescriptor {
            id: StateId::DigitEntry,
            name: "DigitEntry",
            on_enter: Some(digit_entry_enter),
            on_exit: None,
            on_update: digit_entry_update,
        },
        // Index 3 — TimerSetup
        StateDescriptor {
            id: StateId::TimerSetup,
            name: "TimerSetup",
            on_enter: Some(timer_setup_enter),
            on_exit: None,
            on_update: timer_setup_update,
        },
        // Index 4 — Dispensing
        StateDescriptor {
            id: StateId::Dispensing,
            name: "Dispensing",
            on_enter: Some(dispensing_enter),
            on_exit: Some(dispensing_exit),
            on_update: dispensing_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

/// While a notice is active it owns the display and swallows input.
/// Returns `true` when the calling state should skip the rest of its tick.
fn notice_active(ctx: &mut FsmContext) -> bool {
    if let Some((notice, ticks_left)) = ctx.notice {
        ctx.commands.screen = Screen::Notice(notice);
        if ticks_left <= 1 {
            ctx.notice = None;
        } else {
            ctx.notice = Some((notice, ticks_left - 1));
        }
        true
    } else {
        false
    }
}

fn tilt_x(ctx: &FsmContext, dead_zone: u16) -> Tilt {
    classify(ctx.inputs.joy_x, ctx.config.joy_center, dead_zone)
}

fn tilt_y(ctx: &FsmContext, dead_zone: u16) -> Tilt {
    classify(ctx.inputs.joy_y, ctx.config.joy_center, dead_zone)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state — status display, waiting for requests
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.commands.servo = ServoPosition::Rest;
    info!(
        "IDLE: racao={}g agua={}ml mode={:?}",
        ctx.reservoir.food_g(),
        ctx.reservoir.water_ml(),
        ctx.mode
    );
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if notice_active(ctx) {
        return None;
    }

    if ctx.menu_requested {
        ctx.menu_requested = false;
        return Some(StateId::Menu);
    }

    // Border alternates at the original display pacing.
    let half_period = u64::from(ctx.ticks_of(ctx.config.nav_settle_ms));
    ctx.commands.screen = Screen::Status {
        food_g: ctx.reservoir.food_g(),
        water_ml: ctx.reservoir.water_ml(),
        mode: ctx.mode,
        border: (ctx.ticks_in_state / half_period) % 2 == 0,
    };

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  MENU state — joystick-driven option list
// ═══════════════════════════════════════════════════════════════════════════

fn menu_enter(ctx: &mut FsmContext) {
    ctx.menu = MenuState::default();
    info!("MENU: opened");
}

fn menu_update(ctx: &mut FsmContext) -> Option<StateId> {
    if notice_active(ctx) {
        return None;
    }

    ctx.commands.screen = Screen::Menu {
        selected: ctx.menu.selected,
    };

    // Highlight moves once per settle window, wrapping over the option list.
    if ctx.menu.nav_cooldown > 0 {
        ctx.menu.nav_cooldown -= 1;
    } else {
        match tilt_y(ctx, ctx.config.nav_dead_zone) {
            Tilt::Neg => {
                ctx.menu.selected = (ctx.menu.selected + 1) % MENU_OPTION_COUNT;
                ctx.menu.nav_cooldown = ctx.ticks_of(ctx.config.nav_settle_ms) as u8;
            }
            Tilt::Pos => {
                ctx.menu.selected =
                    (ctx.menu.selected + MENU_OPTION_COUNT - 1) % MENU_OPTION_COUNT;
                ctx.menu.nav_cooldown = ctx.ticks_of(ctx.config.nav_settle_ms) as u8;
            }
            Tilt::Center => {}
        }
    }

    if !ctx.inputs.confirm {
        return None;
    }

    match ctx.menu.selected {
        0 => menu_toggle_mode(ctx),
        1 => Some(StateId::DigitEntry),
        2 => {
            ctx.reservoir.refill();
            ctx.emit(AppEvent::Refilled);
            ctx.set_notice(Notice::Refilled);
            info!("MENU: reservoirs refilled");
            None
        }
        _ => Some(StateId::Idle),
    }
}

/// Menu entry 0: flip manual/automatic.
fn menu_toggle_mode(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.mode {
        OperatingMode::Manual => {
            ctx.mode = OperatingMode::Automatic;
            ctx.emit(AppEvent::ModeChanged(OperatingMode::Automatic));
            // Armed immediately at the last-configured period; the setup
            // screen lets the user adjust it before confirming.
            ctx.arm_auto_timer();
            ctx.timer_setup.period_ms = ctx.config.auto_period_ms;
            ctx.timer_setup.adjust_cooldown = 0;
            info!("MENU: mode -> automatic");
            Some(StateId::TimerSetup)
        }
        OperatingMode::Automatic => {
            ctx.mode = OperatingMode::Manual;
            ctx.disarm_auto_timer();
            ctx.emit(AppEvent::ModeChanged(OperatingMode::Manual));
            ctx.set_notice(Notice::ModeManual);
            info!("MENU: mode -> manual, timer disarmed");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DIGIT_ENTRY state — three-digit dose wizard, food then water
// ═══════════════════════════════════════════════════════════════════════════

fn digit_entry_enter(ctx: &mut FsmContext) {
    ctx.entry = DigitEntrySession::new(DoseTarget::Food);
    info!("DIGIT_ENTRY: editing food dose");
}

/// Per tick, in fixed order: render, move cursor (X), adjust digit (Y),
/// then check confirm.  The ordering guarantees no input is starved.
fn digit_entry_update(ctx: &mut FsmContext) -> Option<StateId> {
    if notice_active(ctx) {
        return None;
    }

    ctx.commands.screen = Screen::DigitEntry {
        target: ctx.entry.target,
        digits: ctx.entry.digits,
        cursor: ctx.entry.cursor,
    };

    // Cursor left/right, wrapping over the three positions.
    if ctx.entry.cursor_cooldown > 0 {
        ctx.entry.cursor_cooldown -= 1;
    } else {
        match tilt_x(ctx, ctx.config.nav_dead_zone) {
            Tilt::Pos => {
                ctx.entry.cursor = (ctx.entry.cursor + 1) % 3;
                ctx.entry.cursor_cooldown = ctx.ticks_of(ctx.config.cursor_settle_ms) as u8;
            }
            Tilt::Neg => {
                ctx.entry.cursor = (ctx.entry.cursor + 2) % 3;
                ctx.entry.cursor_cooldown = ctx.ticks_of(ctx.config.cursor_settle_ms) as u8;
            }
            Tilt::Center => {}
        }
    }

    // Digit up/down.  The hundreds position wraps modulo 7 so the shown
    // value can only exceed the 500 cap by way of the clamp at commit.
    if ctx.entry.adjust_cooldown > 0 {
        ctx.entry.adjust_cooldown -= 1;
    } else {
        let base = if ctx.entry.cursor == 0 { 7 } else { 10 };
        let idx = usize::from(ctx.entry.cursor);
        let cooldown = ctx.ticks_of(ctx.config.digit_settle_ms) as u8;
        match tilt_y(ctx, ctx.config.nav_dead_zone) {
            Tilt::Pos => {
                ctx.entry.digits[idx] = (ctx.entry.digits[idx] + 1) % base;
                ctx.entry.adjust_cooldown = cooldown;
            }
            Tilt::Neg => {
                ctx.entry.digits[idx] = (ctx.entry.digits[idx] + base - 1) % base;
                ctx.entry.adjust_cooldown = cooldown;
            }
            Tilt::Center => {}
        }
    }

    if ctx.inputs.confirm {
        return commit_digit_entry(ctx);
    }

    None
}

/// Commit policy: zero falls back to the default dose, values above the
/// cap clamp to it.  Food advances to water; water returns to the menu.
fn commit_digit_entry(ctx: &mut FsmContext) -> Option<StateId> {
    let raw = ctx.entry.value() as i32;
    let target = ctx.entry.target;
    let value = match (raw, target) {
        (0, DoseTarget::Food) => ctx.config.default_food_dose(),
        (0, DoseTarget::Water) => ctx.config.default_water_dose(),
        (v, _) => v.min(ctx.config.dose_max),
    };

    ctx.emit(AppEvent::DoseCommitted {
        target,
        value: value as u32,
    });
    ctx.set_notice(Notice::DoseSaved {
        target,
        value: value as u32,
    });
    info!("DIGIT_ENTRY: committed {:?} dose = {}", target, value);

    match target {
        DoseTarget::Food => {
            ctx.config.food_dose_g = value;
            ctx.entry = DigitEntrySession::new(DoseTarget::Water);
            None
        }
        DoseTarget::Water => {
            ctx.config.water_dose_ml = value;
            Some(StateId::Menu)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  TIMER_SETUP state — adjust the automatic period
// ═══════════════════════════════════════════════════════════════════════════

fn timer_setup_enter(ctx: &mut FsmContext) {
    info!(
        "TIMER_SETUP: adjusting period, currently {} ms",
        ctx.timer_setup.period_ms
    );
}

fn timer_setup_update(ctx: &mut FsmContext) -> Option<StateId> {
    if notice_active(ctx) {
        return None;
    }

    ctx.commands.screen = Screen::TimerSetup {
        period_ms: ctx.timer_setup.period_ms,
    };

    // Narrow dead zone here: value adjustment stays responsive.
    if ctx.timer_setup.adjust_cooldown > 0 {
        ctx.timer_setup.adjust_cooldown -= 1;
    } else {
        let cfg = &ctx.config;
        match tilt_y(ctx, cfg.adjust_dead_zone) {
            Tilt::Pos => {
                ctx.timer_setup.period_ms = (ctx.timer_setup.period_ms
                    + cfg.auto_period_step_ms)
                    .min(cfg.auto_period_max_ms);
                ctx.timer_setup.adjust_cooldown = ctx.ticks_of(cfg.digit_settle_ms) as u8;
            }
            Tilt::Neg => {
                ctx.timer_setup.period_ms = ctx
                    .timer_setup
                    .period_ms
                    .saturating_sub(cfg.auto_period_step_ms)
                    .max(cfg.auto_period_min_ms);
                ctx.timer_setup.adjust_cooldown = ctx.ticks_of(cfg.digit_settle_ms) as u8;
            }
            Tilt::Center => {}
        }
    }

    if ctx.inputs.confirm {
        ctx.config.auto_period_ms = ctx.timer_setup.period_ms;
        ctx.arm_auto_timer();
        info!(
            "TIMER_SETUP: period confirmed at {} ms",
            ctx.config.auto_period_ms
        );
        return Some(StateId::Menu);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISPENSING state — two-phase servo sequence with simulated drain
// ═══════════════════════════════════════════════════════════════════════════

fn dispensing_enter(ctx: &mut FsmContext) {
    let source = ctx.dispense_pending.unwrap_or(super::context::DispenseSource::Button);
    let food_dose = ctx.config.food_dose_g;
    let water_dose = ctx.config.water_dose_ml;

    let outcome = ctx.reservoir.dispense_outcome(food_dose, water_dose);
    if let Some(err) = outcome.err() {
        warn!("DISPENSING: refused, {}", err);
        ctx.dispense = DispenseProgress {
            source,
            refused: true,
            ..DispenseProgress::default()
        };
        ctx.commands.tone = Some(ToneId::Alert);
        ctx.set_notice(Notice::Insufficient(err));
        ctx.emit(AppEvent::DispenseRefused(err));
        return;
    }

    ctx.dispense = DispenseProgress {
        source,
        phase: DispensePhase::Announce,
        food_dose,
        water_dose,
        food_drained: 0,
        water_drained: 0,
        refused: false,
    };
    ctx.emit(AppEvent::DispenseStarted { source });
    info!(
        "DISPENSING: start ({:?}), doses food={}g water={}ml",
        source, food_dose, water_dose
    );
}

fn dispensing_exit(ctx: &mut FsmContext) {
    // Single-flight: the request slot frees only once the sequence is over.
    ctx.dispense_pending = None;
    ctx.commands.servo = ServoPosition::Rest;
}

fn dispensing_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.dispense.refused {
        return Some(ctx.return_to);
    }

    let step_ticks = u64::from(ctx.ticks_of(ctx.config.dispense_step_ms));
    let drain_now = ctx.ticks_in_state % step_ticks == 0;

    match ctx.dispense.phase {
        DispensePhase::Announce => {
            ctx.commands.servo = ServoPosition::ReleaseFood;
            ctx.commands.screen = Screen::Dispensing {
                target: DoseTarget::Food,
            };
            ctx.dispense.phase = DispensePhase::Food;
            None
        }
        DispensePhase::Food => {
            ctx.commands.screen = Screen::Dispensing {
                target: DoseTarget::Food,
            };
            if drain_now {
                let step = ctx.rng.random_range(0..=5);
                let drained = ctx.reservoir.drain_food(step);
                ctx.dispense.food_drained += drained;
                debug!(
                    "DISPENSING: food -{}, {}g left",
                    drained,
                    ctx.reservoir.food_g()
                );
                if ctx.dispense.food_drained >= ctx.dispense.food_dose {
                    ctx.commands.servo = ServoPosition::ReleaseWater;
                    ctx.dispense.phase = DispensePhase::Water;
                }
            }
            None
        }
        DispensePhase::Water => {
            ctx.commands.screen = Screen::Dispensing {
                target: DoseTarget::Water,
            };
            if drain_now {
                let step = ctx.rng.random_range(0..=9);
                let drained = ctx.reservoir.drain_water(step);
                ctx.dispense.water_drained += drained;
                debug!(
                    "DISPENSING: water -{}, {}ml left",
                    drained,
                    ctx.reservoir.water_ml()
                );
                if ctx.dispense.water_drained >= ctx.dispense.water_dose {
                    ctx.commands.servo = ServoPosition::Rest;
                    ctx.commands.tone = Some(ToneId::Confirm);
                    ctx.emit(AppEvent::DispenseCompleted {
                        food_g: ctx.dispense.food_drained,
                        water_ml: ctx.dispense.water_drained,
                    });
                    info!(
                        "DISPENSING: done, drained food={}g water={}ml",
                        ctx.dispense.food_drained, ctx.dispense.water_drained
                    );
                    ctx.dispense.phase = DispensePhase::Settle;
                }
            }
            None
        }
        DispensePhase::Settle => Some(ctx.return_to),
    }
}
