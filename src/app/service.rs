//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM and its shared context and exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!   InputPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│   FSM · Reservoir       │──▶ DisplayPort
//! IndicatorPort ◀─└────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::drivers::matrix::bar_frame;
use crate::fsm::context::{DispenseSource, FsmContext, OperatingMode};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::ui;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetrySnapshot};
use super::ports::{ActuatorPort, DisplayPort, EventSink, IndicatorPort, InputPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`AppService::start`] next.
    /// `rng_seed` seeds the simulated-drain PRNG (boot entropy on target,
    /// a fixed value under test).
    pub fn new(config: SystemConfig, rng_seed: u64) -> Self {
        let ctx = FsmContext::new(config, rng_seed);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        Self {
            fsm,
            ctx,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in the idle display state.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started);
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read inputs → timer → FSM → outputs.
    ///
    /// The `hw` parameter satisfies the input, actuator **and** indicator
    /// ports at once — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.  The display is a separate peripheral
    /// and arrives as its own port.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputPort + ActuatorPort + IndicatorPort),
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Sample inputs
        let (joy_x, joy_y) = hw.read_joystick();
        self.ctx.inputs.joy_x = joy_x;
        self.ctx.inputs.joy_y = joy_y;
        self.ctx.inputs.confirm = hw.confirm_pressed();
        self.ctx.commands.tone = None;

        // 2. Automatic timer — a tick-counted software timer, so tests
        //    never wait on wall-clock time.
        self.tick_auto_timer();

        // 3. Pending dispense interrupts whatever UI state is active;
        //    the FSM returns there once the sequence finishes.
        if self.ctx.dispense_pending.is_some() && prev_state != StateId::Dispensing {
            self.ctx.return_to = prev_state;
            self.fsm.force_transition(StateId::Dispensing, &mut self.ctx);
        }

        // 4. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 5. Apply outputs through the ports
        hw.set_servo(self.ctx.commands.servo);
        if let Some(tone) = self.ctx.commands.tone.take() {
            hw.play_tone(tone);
        }
        let (food_leds, water_leds) = self.ctx.reservoir.led_bar_levels();
        hw.write_frame(&bar_frame(food_leds, water_leds));
        ui::render(&self.ctx.commands.screen, display);

        // 6. Flush events
        for event in self.ctx.outbox.iter() {
            sink.emit(event);
        }
        self.ctx.outbox.clear();

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (button edge, serial console, tests).
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::RequestDispense(source) => self.request_dispense(source),
            AppCommand::OpenMenu => {
                // Menu requests outside the idle display are discarded —
                // the button has no meaning mid-wizard or mid-dispense.
                if self.fsm.current_state() == StateId::Idle {
                    self.ctx.menu_requested = true;
                } else {
                    debug!(
                        "menu request ignored in {:?}",
                        self.fsm.current_state()
                    );
                }
            }
            AppCommand::Refill => {
                self.ctx.reservoir.refill();
                sink.emit(&AppEvent::Refilled);
            }
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.ctx.config = new_config;
                    info!("Configuration updated at runtime");
                }
                Err(e) => warn!("config update rejected: {}", e),
            },
            AppCommand::ForceState(target) => {
                let prev = self.fsm.current_state();
                self.fsm.force_transition(target, &mut self.ctx);
                sink.emit(&AppEvent::StateChanged {
                    from: prev,
                    to: target,
                });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            state: self.fsm.current_state(),
            mode: self.ctx.mode,
            food_g: self.ctx.reservoir.food_g(),
            water_ml: self.ctx.reservoir.water_ml(),
            auto_period_ms: self.ctx.config.auto_period_ms,
            auto_armed: self.ctx.auto_timer.armed,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.ctx.mode
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration (for console read-back).
    pub fn current_config(&self) -> SystemConfig {
        self.ctx.config.clone()
    }

    /// Direct context access for tests and diagnostics.
    #[doc(hidden)]
    pub fn context_mut(&mut self) -> &mut FsmContext {
        &mut self.ctx
    }

    // ── Internal ──────────────────────────────────────────────

    fn request_dispense(&mut self, source: DispenseSource) {
        // Button requests only count in manual mode; the timer requests
        // regardless.  Either way the slot is single-flight.
        if source == DispenseSource::Button && self.ctx.mode != OperatingMode::Manual {
            debug!("feed button ignored in automatic mode");
            return;
        }
        if self.ctx.dispense_pending.is_some() {
            debug!("dispense request dropped, one already in flight");
            return;
        }
        self.ctx.dispense_pending = Some(source);
    }

    fn tick_auto_timer(&mut self) {
        if self.ctx.mode != OperatingMode::Automatic || !self.ctx.auto_timer.armed {
            return;
        }
        self.ctx.auto_timer.elapsed += 1;
        if self.ctx.auto_timer.elapsed >= self.ctx.auto_timer.period_ticks {
            self.ctx.auto_timer.elapsed = 0;
            self.request_dispense(DispenseSource::Timer);
        }
    }
}
