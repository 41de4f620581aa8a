//! Integration tests: AppService → FSM → output ports.
//!
//! Drives the whole service through mock adapters exactly the way the
//! main loop does: joystick samples, debounced edges and control ticks
//! in, servo/tone/display/matrix calls out.

use petfeeder::app::commands::AppCommand;
use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{ActuatorPort, DisplayPort, EventSink, IndicatorPort, InputPort};
use petfeeder::app::service::AppService;
use petfeeder::config::SystemConfig;
use petfeeder::drivers::buzzer::ToneId;
use petfeeder::drivers::matrix::{FOOD_COLUMN, WATER_COLUMN};
use petfeeder::drivers::servo::ServoPosition;
use petfeeder::error::DispenseError;
use petfeeder::fsm::context::{DispenseSource, DoseTarget, OperatingMode};
use petfeeder::fsm::StateId;
use petfeeder::pins::MATRIX_PIXELS;

// ── Mock implementations ──────────────────────────────────────

const CENTER: u16 = 2047;

struct MockHw {
    joy: (u16, u16),
    confirm_next: bool,
    servo_calls: Vec<ServoPosition>,
    tones: Vec<ToneId>,
    last_frame: [u32; MATRIX_PIXELS],
}

impl MockHw {
    fn new() -> Self {
        Self {
            joy: (CENTER, CENTER),
            confirm_next: false,
            servo_calls: Vec::new(),
            tones: Vec::new(),
            last_frame: [0; MATRIX_PIXELS],
        }
    }
}

impl InputPort for MockHw {
    fn read_joystick(&mut self) -> (u16, u16) {
        self.joy
    }
    fn confirm_pressed(&mut self) -> bool {
        std::mem::take(&mut self.confirm_next)
    }
}

impl ActuatorPort for MockHw {
    fn set_servo(&mut self, position: ServoPosition) {
        if self.servo_calls.last() != Some(&position) {
            self.servo_calls.push(position);
        }
    }
    fn play_tone(&mut self, tone: ToneId) {
        self.tones.push(tone);
    }
}

impl IndicatorPort for MockHw {
    fn write_frame(&mut self, frame: &[u32; MATRIX_PIXELS]) {
        self.last_frame = *frame;
    }
}

#[derive(Default)]
struct MockScreen {
    texts: Vec<String>,
}

impl DisplayPort for MockScreen {
    fn clear(&mut self) {
        self.texts.clear();
    }
    fn draw_text(&mut self, _x: i32, _y: i32, text: &str) {
        self.texts.push(text.to_owned());
    }
    fn draw_rect(&mut self, _x: i32, _y: i32, _w: u32, _h: u32) {}
    fn present(&mut self) {}
}

#[derive(Default)]
struct CollectingSink {
    events: Vec<AppEvent>,
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Harness ───────────────────────────────────────────────────

struct Harness {
    app: AppService,
    hw: MockHw,
    screen: MockScreen,
    sink: CollectingSink,
}

impl Harness {
    fn new() -> Self {
        let mut h = Self {
            app: AppService::new(SystemConfig::default(), 42),
            hw: MockHw::new(),
            screen: MockScreen::default(),
            sink: CollectingSink::default(),
        };
        h.app.start(&mut h.sink);
        h
    }

    fn tick(&mut self) {
        self.app
            .tick(&mut self.hw, &mut self.screen, &mut self.sink);
    }

    fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// One tick with an accepted confirm edge.
    fn confirm(&mut self) {
        self.hw.confirm_next = true;
        self.tick();
    }

    /// One downward joystick flick, then recentre and wait out the
    /// navigation cooldown.
    fn nav_down(&mut self) {
        self.hw.joy.1 = 100;
        self.tick();
        self.hw.joy.1 = CENTER;
        self.tick_n(7);
    }

    fn has_event(&self, pred: impl Fn(&AppEvent) -> bool) -> bool {
        self.sink.events.iter().any(pred)
    }

    fn wait_out_notice(&mut self) {
        // Longest notice is 3 s = 60 ticks at the 50 ms cadence.
        self.tick_n(61);
    }

    fn run_dispense_to_completion(&mut self) {
        let mut guard = 0;
        self.tick();
        while self.app.state() == StateId::Dispensing {
            self.tick();
            guard += 1;
            assert!(guard < 2000, "dispense never finished");
        }
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn boot_shows_status_screen() {
    let mut h = Harness::new();
    h.tick();
    assert_eq!(h.app.state(), StateId::Idle);
    assert!(h.screen.texts.iter().any(|t| t == "Racao: 1000 g"));
    assert!(h.screen.texts.iter().any(|t| t == "Agua: 1000 ml"));
    assert!(h.screen.texts.iter().any(|t| t == "A>racao  B>Menu"));
}

#[test]
fn menu_opens_from_idle_and_voltar_exits() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    assert_eq!(h.app.state(), StateId::Menu);
    // The menu screen renders from the first full menu tick onward.
    h.tick();
    assert!(h.screen.texts.iter().any(|t| t == "MENU"));

    // Navigate down three entries to "Voltar" and confirm.
    h.nav_down();
    h.nav_down();
    h.nav_down();
    h.confirm();
    assert_eq!(h.app.state(), StateId::Idle);
}

#[test]
fn manual_feed_dispenses_and_returns_to_idle() {
    let mut h = Harness::new();
    h.app.handle_command(
        AppCommand::RequestDispense(DispenseSource::Button),
        &mut h.sink,
    );
    h.run_dispense_to_completion();

    assert_eq!(h.app.state(), StateId::Idle);
    assert!(h.has_event(|e| matches!(
        e,
        AppEvent::DispenseStarted {
            source: DispenseSource::Button
        }
    )));
    assert!(h.has_event(|e| matches!(e, AppEvent::DispenseCompleted { .. })));

    // Servo sequence: food gate, water gate, back to rest.
    assert!(h.hw.servo_calls.contains(&ServoPosition::ReleaseFood));
    assert!(h.hw.servo_calls.contains(&ServoPosition::ReleaseWater));
    assert_eq!(h.hw.servo_calls.last(), Some(&ServoPosition::Rest));
    assert!(h.hw.tones.contains(&ToneId::Confirm));

    let t = h.app.build_telemetry();
    assert!(t.food_g < 1000 && t.food_g >= 0);
    assert!(t.water_ml < 1000 && t.water_ml >= 0);
}

#[test]
fn refused_dispense_plays_alert_and_leaves_stock() {
    let mut h = Harness::new();
    h.app.context_mut().reservoir.drain_food(960); // 40 g left, dose 50
    h.app.handle_command(
        AppCommand::RequestDispense(DispenseSource::Button),
        &mut h.sink,
    );
    h.tick_n(3);

    assert_eq!(h.app.state(), StateId::Idle);
    assert!(h.has_event(|e| matches!(
        e,
        AppEvent::DispenseRefused(DispenseError::InsufficientFood)
    )));
    assert!(h.hw.tones.contains(&ToneId::Alert));
    assert_eq!(h.app.build_telemetry().food_g, 40);
    assert!(h.screen.texts.iter().any(|t| t == "Sem racao!"));
    assert!(
        !h.hw.servo_calls.contains(&ServoPosition::ReleaseFood),
        "refusal must skip actuation entirely"
    );
}

#[test]
fn refill_from_menu_resets_both_reservoirs() {
    let mut h = Harness::new();
    h.app.context_mut().reservoir.drain_food(500);
    h.app.context_mut().reservoir.drain_water(800);
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();

    h.nav_down();
    h.nav_down(); // "Encher"
    h.confirm();

    let t = h.app.build_telemetry();
    assert_eq!(t.food_g, 1000);
    assert_eq!(t.water_ml, 1000);
    assert!(h.has_event(|e| matches!(e, AppEvent::Refilled)));
}

#[test]
fn mode_toggle_arms_default_period_and_back_disarms() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    h.confirm(); // entry 0: Modo -> automatic, opens timer setup

    assert_eq!(h.app.state(), StateId::TimerSetup);
    assert_eq!(h.app.mode(), OperatingMode::Automatic);
    assert!(h.has_event(|e| matches!(e, AppEvent::AutoTimerArmed { period_ms: 5000 })));

    h.confirm(); // keep the default period
    assert_eq!(h.app.state(), StateId::Menu);

    h.confirm(); // entry 0 again: back to manual
    assert_eq!(h.app.mode(), OperatingMode::Manual);
    assert!(h.has_event(|e| matches!(e, AppEvent::AutoTimerDisarmed)));

    // Disarmed timer must raise no further requests.
    h.wait_out_notice();
    let before = h.sink.events.len();
    h.tick_n(200);
    assert!(!h.sink.events[before..]
        .iter()
        .any(|e| matches!(e, AppEvent::DispenseStarted { .. })));
}

#[test]
fn automatic_timer_fires_dispense_and_ignores_feed_button() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    h.confirm(); // -> automatic + timer setup
    h.confirm(); // period confirmed (5000 ms = 100 ticks)
    h.nav_down();
    h.nav_down();
    h.nav_down(); // "Voltar"
    h.confirm();
    assert_eq!(h.app.state(), StateId::Idle);

    // The feed button means nothing in automatic mode.
    h.app.handle_command(
        AppCommand::RequestDispense(DispenseSource::Button),
        &mut h.sink,
    );
    assert!(!h.has_event(|e| matches!(
        e,
        AppEvent::DispenseStarted {
            source: DispenseSource::Button
        }
    )));

    // ...but the timer fires on its own.
    h.tick_n(101);
    assert!(h.has_event(|e| matches!(
        e,
        AppEvent::DispenseStarted {
            source: DispenseSource::Timer
        }
    )));
}

#[test]
fn digit_wizard_commits_food_then_water() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    h.nav_down(); // "Doses"
    h.confirm();
    assert_eq!(h.app.state(), StateId::DigitEntry);

    // Push the hundreds digit to 1 (joystick up), giving 100 g.
    h.hw.joy.1 = 4000;
    h.tick();
    h.hw.joy.1 = CENTER;
    h.tick_n(4);
    h.confirm();

    assert!(h.has_event(|e| matches!(
        e,
        AppEvent::DoseCommitted {
            target: DoseTarget::Food,
            value: 100
        }
    )));
    assert_eq!(h.app.current_config().food_dose_g, 100);
    assert_eq!(h.app.state(), StateId::DigitEntry, "water entry follows");

    // Leave water at zero: the default dose applies.
    h.wait_out_notice();
    h.confirm();
    assert!(h.has_event(|e| matches!(
        e,
        AppEvent::DoseCommitted {
            target: DoseTarget::Water,
            value: 30
        }
    )));
    assert_eq!(h.app.state(), StateId::Menu);
}

#[test]
fn dispense_interrupts_menu_and_returns_there() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    assert_eq!(h.app.state(), StateId::Menu);

    // Timer-sourced requests land regardless of the UI state.
    h.app.context_mut().mode = OperatingMode::Automatic;
    h.app.context_mut().dispense_pending = Some(DispenseSource::Timer);
    h.run_dispense_to_completion();
    assert_eq!(h.app.state(), StateId::Menu);
}

#[test]
fn matrix_bars_track_reservoir_levels() {
    let mut h = Harness::new();
    h.tick();
    // Full reservoirs light all five LEDs of both columns.
    for &i in FOOD_COLUMN.iter().chain(WATER_COLUMN.iter()) {
        assert_ne!(h.hw.last_frame[i], 0, "pixel {i} should be lit");
    }

    h.app.context_mut().reservoir.drain_food(801); // 199 g -> one LED
    h.app.context_mut().reservoir.drain_water(1000); // empty -> none
    h.tick();
    let lit_food = FOOD_COLUMN
        .iter()
        .filter(|&&i| h.hw.last_frame[i] != 0)
        .count();
    let lit_water = WATER_COLUMN
        .iter()
        .filter(|&&i| h.hw.last_frame[i] != 0)
        .count();
    assert_eq!(lit_food, 1);
    assert_eq!(lit_water, 0);
}

#[test]
fn menu_ignored_outside_idle() {
    let mut h = Harness::new();
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick();
    assert_eq!(h.app.state(), StateId::Menu);

    // A second menu press while already in the menu changes nothing.
    h.app.handle_command(AppCommand::OpenMenu, &mut h.sink);
    h.tick_n(5);
    assert_eq!(h.app.state(), StateId::Menu);
}
