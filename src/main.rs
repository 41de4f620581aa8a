//! PetFeeder Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter        OledDisplay      LogEventSink    │
//! │  (Input+Actuator+       (DisplayPort)    (EventSink)     │
//! │   Indicator)                                             │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │              AppService (pure logic)               │  │
//! │  │  FSM · Reservoir · Auto-dispense timer             │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use petfeeder::adapters::display::init_oled;
use petfeeder::adapters::hardware::HardwareAdapter;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::time::TimeAdapter;
use petfeeder::app::commands::AppCommand;
use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{ActuatorPort, EventSink};
use petfeeder::app::service::AppService;
use petfeeder::config::SystemConfig;
use petfeeder::drivers::button::{ButtonId, DebouncedButton};
use petfeeder::drivers::buzzer::ToneId;
use petfeeder::drivers::hw_init;
use petfeeder::events::{self, push_event, Event};
use petfeeder::fsm::context::DispenseSource;
use petfeeder::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Hardware bring-up ──────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {} — continuing without button ISRs", e);
    }

    let config = SystemConfig::default();

    if let Err(e) = hw_init::start_control_timer(config.control_loop_interval_ms) {
        error!("Control timer init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // The OLED sits alone on I2C0 (SDA GPIO14, SCL GPIO15, 400 kHz).
    let p = Peripherals::take()?;
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(p.i2c0, p.pins.gpio14, p.pins.gpio15, &i2c_cfg)?;
    let mut display = init_oled(i2c).map_err(|e| anyhow::anyhow!("OLED init: {}", e))?;

    // ── 3. Adapters ───────────────────────────────────────────
    let time = TimeAdapter::new();
    let mut hw = HardwareAdapter::new(config.debounce_ms);
    let mut log_sink = LogEventSink::new();
    let mut feed_btn = DebouncedButton::new(ButtonId::Feed, config.debounce_ms);
    let mut menu_btn = DebouncedButton::new(ButtonId::Menu, config.debounce_ms);

    // Close both gates before anything else moves.
    hw.park();

    // Panel settle time before the chime.
    hw_init::delay_ms(2000);
    hw.play_tone(ToneId::Startup);

    // ── 4. App service ────────────────────────────────────────
    let mut app = AppService::new(config.clone(), time.uptime_us() | 1);
    app.start(&mut log_sink);

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    let telemetry_ticks =
        u64::from(config.telemetry_interval_secs) * 1000 / u64::from(config.control_loop_interval_ms);
    let mut tick_counter: u64 = 0;

    loop {
        events::drain_events(|event| match event {
            Event::ControlTick => {
                tick_counter += 1;
                app.tick(&mut hw, &mut display, &mut log_sink);
                if tick_counter % telemetry_ticks == 0 {
                    push_event(Event::TelemetryTick);
                }
            }

            Event::FeedPressed => {
                // The ISR timestamps; the debounce window is applied here.
                if feed_btn.poll() {
                    app.handle_command(
                        AppCommand::RequestDispense(DispenseSource::Button),
                        &mut log_sink,
                    );
                }
            }

            Event::MenuPressed => {
                if menu_btn.poll() {
                    app.handle_command(AppCommand::OpenMenu, &mut log_sink);
                }
            }

            Event::TelemetryTick => {
                log_sink.emit(&AppEvent::Telemetry(app.build_telemetry()));
            }
        });

        // Idle until the next timer or GPIO interrupt lands.
        hw_init::delay_ms(5);
    }
}
