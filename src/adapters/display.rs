//! Display adapter — renders [`DisplayPort`] calls with embedded-graphics.
//!
//! The adapter is generic over any monochrome draw target that can flush
//! a frame, so the same drawing code runs against the SSD1306 OLED on
//! target and against `MockDisplay` in host tests.  Draw failures are
//! logged and swallowed: a dropped frame must never halt the feeder.

use core::fmt::Debug;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use log::warn;

use crate::app::ports::DisplayPort;

/// A monochrome draw target that can push its buffer to the panel.
pub trait FlushTarget: DrawTarget<Color = BinaryColor> {
    /// Transfer the frame.  Errors are handled by the caller.
    fn flush_frame(&mut self) -> Result<(), Self::Error>;
}

/// [`DisplayPort`] implementation over any [`FlushTarget`].
pub struct GraphicsDisplay<D> {
    target: D,
}

impl<D> GraphicsDisplay<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }
}

impl<D> DisplayPort for GraphicsDisplay<D>
where
    D: FlushTarget,
    D::Error: Debug,
{
    fn clear(&mut self) {
        if let Err(e) = self.target.clear(BinaryColor::Off) {
            warn!("display clear failed: {:?}", e);
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        if let Err(e) =
            Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(&mut self.target)
        {
            warn!("display text failed: {:?}", e);
        }
    }

    fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let style = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        if let Err(e) = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(style)
            .draw(&mut self.target)
        {
            warn!("display rect failed: {:?}", e);
        }
    }

    fn present(&mut self) {
        if let Err(e) = self.target.flush_frame() {
            warn!("display flush failed: {:?}", e);
        }
    }
}

// ── SSD1306 over I2C (target hardware) ────────────────────────

#[cfg(target_os = "espidf")]
mod oled {
    use esp_idf_hal::i2c::I2cDriver;
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::size::DisplaySize128x64;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::{FlushTarget, GraphicsDisplay};
    use crate::error::{Error, Result};

    type OledPanel = Ssd1306<
        I2CInterface<I2cDriver<'static>>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    impl FlushTarget for OledPanel {
        fn flush_frame(&mut self) -> core::result::Result<(), Self::Error> {
            self.flush()
        }
    }

    /// The production 128×64 OLED display.
    pub type OledDisplay = GraphicsDisplay<OledPanel>;

    /// Bring up the SSD1306 panel on the given I2C bus.
    pub fn init_oled(i2c: I2cDriver<'static>) -> Result<OledDisplay> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|_| Error::Init("ssd1306 init"))?;
        Ok(GraphicsDisplay::new(panel))
    }
}

#[cfg(target_os = "espidf")]
pub use oled::{init_oled, OledDisplay};

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    impl FlushTarget for MockDisplay<BinaryColor> {
        fn flush_frame(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn draws_text_pixels_into_target() {
        let mut mock = MockDisplay::new();
        mock.set_allow_overdraw(true);
        mock.set_allow_out_of_bounds_drawing(true);
        let mut display = GraphicsDisplay::new(mock);
        display.draw_text(0, 0, "A");
        let lit = display
            .target()
            .affected_area()
            .size;
        assert!(lit.width > 0 && lit.height > 0, "glyph must light pixels");
    }

    #[test]
    fn rect_strokes_outline() {
        let mut mock = MockDisplay::new();
        mock.set_allow_overdraw(true);
        let mut display = GraphicsDisplay::new(mock);
        display.draw_rect(0, 0, 10, 10);
        assert_eq!(display.target().get_pixel(Point::new(0, 0)), Some(BinaryColor::On));
        assert_eq!(display.target().get_pixel(Point::new(9, 9)), Some(BinaryColor::On));
        assert_eq!(display.target().get_pixel(Point::new(5, 5)), None);
    }
}
