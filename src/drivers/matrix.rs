//! 5x5 WS2812 indicator matrix driver.
//!
//! The matrix shows two vertical bar graphs: the food level in green on
//! one column, the water level in blue on another.  Pixel values are
//! packed GRB words as the WS2812 shifts them (green in the top byte).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: streams the frame out over RMT via hw_init.
//! On host/test: keeps the last frame for inspection.

use crate::drivers::hw_init;
use crate::pins::MATRIX_PIXELS;

/// Physical LED indices of the food column, bottom to top
/// (the matrix is wired as a serpentine).
pub const FOOD_COLUMN: [usize; 5] = [4, 5, 14, 15, 24];
/// Physical LED indices of the water column, bottom to top.
pub const WATER_COLUMN: [usize; 5] = [2, 7, 12, 17, 22];

/// Dim green, packed GRB.
const FOOD_COLOR: u32 = 0x2600_0000;
/// Dim blue, packed GRB.
const WATER_COLOR: u32 = 0x0000_2600;

/// Build the indicator frame for the given bar levels (0–5 LEDs each).
pub fn bar_frame(food_leds: u8, water_leds: u8) -> [u32; MATRIX_PIXELS] {
    let mut frame = [0u32; MATRIX_PIXELS];
    for &idx in FOOD_COLUMN.iter().take(food_leds.min(5) as usize) {
        frame[idx] = FOOD_COLOR;
    }
    for &idx in WATER_COLUMN.iter().take(water_leds.min(5) as usize) {
        frame[idx] = WATER_COLOR;
    }
    frame
}

pub struct MatrixDriver {
    frame: [u32; MATRIX_PIXELS],
}

impl MatrixDriver {
    pub fn new() -> Self {
        Self {
            frame: [0; MATRIX_PIXELS],
        }
    }

    /// Push a frame to the LEDs.
    pub fn write(&mut self, frame: &[u32; MATRIX_PIXELS]) {
        hw_init::ws2812_write(frame);
        self.frame = *frame;
    }

    /// Last frame written (simulation/test introspection).
    pub fn frame(&self) -> &[u32; MATRIX_PIXELS] {
        &self.frame
    }
}
