//! ISR-debounced edge buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with internal pull-ups.  Each GPIO fires
//! on the falling edge; the ISR records a raw millisecond timestamp into a
//! per-button atomic, and `poll()` (called from the main loop) applies the
//! debounce rule: an edge is accepted only if at least 200 ms have elapsed
//! since the last *accepted* edge of the same button.
//!
//! The joystick confirm button uses the same mechanism but is sampled
//! synchronously by level (`confirm_pressed`) because the menu and wizard
//! loops poll it inside their own tick cadence rather than reacting to a
//! queued event.

use core::sync::atomic::{AtomicU32, Ordering};

/// Raw ISR timestamps (milliseconds since boot, truncated to u32).
/// Written by the ISRs, read by the main loop.
static FEED_ISR_MS: AtomicU32 = AtomicU32::new(0);
static MENU_ISR_MS: AtomicU32 = AtomicU32::new(0);
static CONFIRM_ISR_MS: AtomicU32 = AtomicU32::new(0);

/// Which physical button a [`DebouncedButton`] instance watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Feed,
    Menu,
    Confirm,
}

impl ButtonId {
    fn isr_slot(self) -> &'static AtomicU32 {
        match self {
            Self::Feed => &FEED_ISR_MS,
            Self::Menu => &MENU_ISR_MS,
            Self::Confirm => &CONFIRM_ISR_MS,
        }
    }
}

/// Debounced falling-edge detector over one button's ISR timestamp.
///
/// Each instance keeps its own last-accepted-edge time, so the three
/// buttons debounce independently.
pub struct DebouncedButton {
    id: ButtonId,
    debounce_ms: u32,
    /// Timestamp of the last edge this instance consumed (raw, any edge).
    last_seen_ms: u32,
    /// Timestamp of the last edge that passed the debounce window.
    last_accepted_ms: u32,
}

impl DebouncedButton {
    pub fn new(id: ButtonId, debounce_ms: u32) -> Self {
        Self {
            id,
            debounce_ms,
            last_seen_ms: 0,
            last_accepted_ms: 0,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Consume a pending edge, if one passed the debounce window.
    ///
    /// Returns `true` at most once per accepted edge.  Edges arriving
    /// within `debounce_ms` of the last accepted edge are swallowed.
    pub fn poll(&mut self) -> bool {
        let isr_ms = self.id.isr_slot().load(Ordering::Acquire);
        if isr_ms == 0 || isr_ms == self.last_seen_ms {
            return false;
        }
        self.last_seen_ms = isr_ms;

        if isr_ms.wrapping_sub(self.last_accepted_ms) >= self.debounce_ms
            || self.last_accepted_ms == 0
        {
            self.last_accepted_ms = isr_ms;
            return true;
        }
        false
    }
}

/// ISR handler — register on the button GPIO falling edge.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn button_isr_handler(id: ButtonId, now_ms: u32) {
    // A 0 timestamp means "no edge yet"; nudge real edges off it.
    let stamp = if now_ms == 0 { 1 } else { now_ms };
    id.isr_slot().store(stamp, Ordering::Release);
}
