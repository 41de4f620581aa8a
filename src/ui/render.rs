//! Turns a [`Screen`] value into display port draw calls.
//!
//! All text formatting happens here, into bounded stack buffers; the
//! 128×64 frame limits are enforced at this boundary only.

use core::fmt::Write as _;

use heapless::String;

use crate::app::ports::DisplayPort;
use crate::error::DispenseError;
use crate::fsm::context::{DoseTarget, OperatingMode};
use crate::ui::screen::{Notice, Screen, MENU_LABELS};

/// Frame width in pixels.
pub const FRAME_W: u32 = 128;
/// Frame height in pixels.
pub const FRAME_H: u32 = 64;

type Line = String<24>;

fn line(args: core::fmt::Arguments<'_>) -> Line {
    let mut s = Line::new();
    // Truncation on overflow is acceptable; the frame is 21 chars wide.
    let _ = s.write_fmt(args);
    s
}

/// Render one frame.  Always clears, draws, then presents.
pub fn render<D: DisplayPort>(screen: &Screen, display: &mut D) {
    display.clear();
    match screen {
        Screen::Status {
            food_g,
            water_ml,
            mode,
            border,
        } => draw_status(display, *food_g, *water_ml, *mode, *border),
        Screen::Menu { selected } => draw_menu(display, *selected),
        Screen::DigitEntry {
            target,
            digits,
            cursor,
        } => draw_digit_entry(display, *target, digits, *cursor),
        Screen::TimerSetup { period_ms } => draw_timer_setup(display, *period_ms),
        Screen::Dispensing { target } => draw_dispensing(display, *target),
        Screen::Notice(notice) => draw_notice(display, notice),
    }
    display.present();
}

fn draw_status(display: &mut impl DisplayPort, food_g: i32, water_ml: i32, mode: OperatingMode, border: bool) {
    if border {
        display.draw_rect(0, 0, FRAME_W, FRAME_H);
    }
    display.draw_text(28, 2, "PET FEEDER");
    display.draw_text(8, 16, &line(format_args!("Racao: {} g", food_g)));
    display.draw_text(8, 26, &line(format_args!("Agua: {} ml", water_ml)));
    let mode_label = match mode {
        OperatingMode::Manual => "Modo: manual",
        OperatingMode::Automatic => "Modo: automatico",
    };
    display.draw_text(8, 38, mode_label);
    display.draw_text(8, 52, "A>racao  B>Menu");
}

fn draw_menu(display: &mut impl DisplayPort, selected: u8) {
    display.draw_text(48, 2, "MENU");
    for (i, label) in MENU_LABELS.iter().enumerate() {
        let y = 16 + 10 * i as i32;
        if i as u8 == selected {
            display.draw_text(2, y, ">");
        }
        display.draw_text(12, y, label);
    }
    display.draw_text(80, 54, ".>click");
}

fn draw_digit_entry(display: &mut impl DisplayPort, target: DoseTarget, digits: &[u8; 3], cursor: u8) {
    let label = match target {
        DoseTarget::Food => "Racao (g):",
        DoseTarget::Water => "Agua (ml):",
    };
    display.draw_text(10, 12, label);
    for (i, d) in digits.iter().enumerate() {
        let x = 40 + 12 * i as i32;
        display.draw_text(x, 28, &line(format_args!("{}", d)));
    }
    display.draw_text(40 + 12 * i32::from(cursor), 40, "^");
}

fn draw_timer_setup(display: &mut impl DisplayPort, period_ms: u32) {
    display.draw_text(10, 16, "Intervalo auto:");
    display.draw_text(10, 32, &line(format_args!("{} s", period_ms / 1000)));
    display.draw_text(10, 52, ".>confirma");
}

fn draw_dispensing(display: &mut impl DisplayPort, target: DoseTarget) {
    let msg = match target {
        DoseTarget::Food => "Despejando racao...",
        DoseTarget::Water => "Despejando agua...",
    };
    display.draw_text(4, 28, msg);
}

fn draw_notice(display: &mut impl DisplayPort, notice: &Notice) {
    match notice {
        Notice::Refilled => display.draw_text(16, 28, "Adicionado!"),
        Notice::ModeManual => display.draw_text(16, 28, "Modo manual"),
        Notice::DoseSaved { target, value } => {
            let label = match target {
                DoseTarget::Food => "Racao salva:",
                DoseTarget::Water => "Agua salva:",
            };
            display.draw_text(10, 22, label);
            display.draw_text(10, 36, &line(format_args!("{}", value)));
        }
        Notice::Insufficient(err) => {
            let msg = match err {
                DispenseError::InsufficientFood => "Sem racao!",
                DispenseError::InsufficientWater => "Sem agua!",
            };
            display.draw_text(16, 28, msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::DisplayPort;

    /// Records draw calls for assertion.
    #[derive(Default)]
    struct RecordingDisplay {
        cleared: u32,
        presented: u32,
        rects: Vec<(i32, i32, u32, u32)>,
        texts: Vec<(i32, i32, std::string::String)>,
    }

    impl DisplayPort for RecordingDisplay {
        fn clear(&mut self) {
            self.cleared += 1;
        }
        fn draw_text(&mut self, x: i32, y: i32, text: &str) {
            self.texts.push((x, y, text.to_owned()));
        }
        fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
            self.rects.push((x, y, w, h));
        }
        fn present(&mut self) {
            self.presented += 1;
        }
    }

    fn text_at(display: &RecordingDisplay, needle: &str) -> bool {
        display.texts.iter().any(|(_, _, t)| t == needle)
    }

    #[test]
    fn status_screen_shows_levels_and_hints() {
        let mut d = RecordingDisplay::default();
        render(
            &Screen::Status {
                food_g: 850,
                water_ml: 430,
                mode: OperatingMode::Manual,
                border: true,
            },
            &mut d,
        );
        assert_eq!(d.cleared, 1);
        assert_eq!(d.presented, 1);
        assert_eq!(d.rects, vec![(0, 0, FRAME_W, FRAME_H)]);
        assert!(text_at(&d, "Racao: 850 g"));
        assert!(text_at(&d, "Agua: 430 ml"));
        assert!(text_at(&d, "Modo: manual"));
        assert!(text_at(&d, "A>racao  B>Menu"));
    }

    #[test]
    fn status_border_alternates_off() {
        let mut d = RecordingDisplay::default();
        render(
            &Screen::Status {
                food_g: 0,
                water_ml: 0,
                mode: OperatingMode::Automatic,
                border: false,
            },
            &mut d,
        );
        assert!(d.rects.is_empty());
        assert!(text_at(&d, "Modo: automatico"));
    }

    #[test]
    fn menu_marks_selected_entry() {
        let mut d = RecordingDisplay::default();
        render(&Screen::Menu { selected: 2 }, &mut d);
        // The ">" marker sits on the third row (y = 16 + 10*2).
        assert!(d.texts.contains(&(2, 36, ">".to_owned())));
        for label in MENU_LABELS {
            assert!(text_at(&d, label));
        }
    }

    #[test]
    fn digit_entry_places_caret_under_cursor() {
        let mut d = RecordingDisplay::default();
        render(
            &Screen::DigitEntry {
                target: DoseTarget::Water,
                digits: [1, 2, 5],
                cursor: 2,
            },
            &mut d,
        );
        assert!(text_at(&d, "Agua (ml):"));
        assert!(d.texts.contains(&(40, 28, "1".to_owned())));
        assert!(d.texts.contains(&(52, 28, "2".to_owned())));
        assert!(d.texts.contains(&(64, 28, "5".to_owned())));
        assert!(d.texts.contains(&(64, 40, "^".to_owned())));
    }

    #[test]
    fn timer_setup_shows_period_in_seconds() {
        let mut d = RecordingDisplay::default();
        render(&Screen::TimerSetup { period_ms: 7_000 }, &mut d);
        assert!(text_at(&d, "7 s"));
    }

    #[test]
    fn insufficient_notice_names_resource() {
        let mut d = RecordingDisplay::default();
        render(
            &Screen::Notice(Notice::Insufficient(DispenseError::InsufficientWater)),
            &mut d,
        );
        assert!(text_at(&d, "Sem agua!"));
    }
}
