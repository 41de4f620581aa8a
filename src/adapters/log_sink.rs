//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  Tests use a collecting
//! sink instead; both implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | mode={:?} | racao={}g agua={}ml | \
                     auto_period={}ms armed={}",
                    t.state, t.mode, t.food_g, t.water_ml, t.auto_period_ms, t.auto_armed,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ModeChanged(mode) => {
                info!("MODE  | {:?}", mode);
            }
            AppEvent::AutoTimerArmed { period_ms } => {
                info!("TIMER | armed, period={}ms", period_ms);
            }
            AppEvent::AutoTimerDisarmed => {
                info!("TIMER | disarmed");
            }
            AppEvent::DoseCommitted { target, value } => {
                info!("DOSE  | {:?} = {}", target, value);
            }
            AppEvent::Refilled => {
                info!("STOCK | reservoirs refilled");
            }
            AppEvent::DispenseStarted { source } => {
                info!("FEED  | started ({:?})", source);
            }
            AppEvent::DispenseCompleted { food_g, water_ml } => {
                info!("FEED  | done, drained {}g / {}ml", food_g, water_ml);
            }
            AppEvent::DispenseRefused(err) => {
                warn!("FEED  | refused: {}", err);
            }
            AppEvent::Started => {
                info!("START | main loop running");
            }
        }
    }
}
