//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (button ISRs,
//! the serial console, tests) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;
use crate::fsm::context::DispenseSource;
use crate::fsm::StateId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Request a dispense.  Button requests are honoured in manual mode
    /// only; a request is dropped while another is still in flight.
    RequestDispense(DispenseSource),

    /// Open the main menu.  Honoured only from the idle display.
    OpenMenu,

    /// Reset both reservoirs to capacity (maintenance hatch closed).
    Refill,

    /// Hot-reload configuration (e.g. from the serial console).
    UpdateConfig(SystemConfig),

    /// Force the FSM into a specific state (debug / testing only).
    ForceState(StateId),
}
