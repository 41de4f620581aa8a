//! GPIO / peripheral pin assignments for the PetFeeder main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// User buttons (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Button A — request a manual dispense.
pub const FEED_BUTTON_GPIO: i32 = 5;
/// Button B — open the menu.
pub const MENU_BUTTON_GPIO: i32 = 6;
/// Joystick push button — confirm the current selection.
pub const CONFIRM_BUTTON_GPIO: i32 = 22;

// ---------------------------------------------------------------------------
// Joystick axes (ADC1)
// ---------------------------------------------------------------------------

/// Vertical axis — menu navigation / value adjustment.
pub const JOY_Y_ADC_GPIO: i32 = 26;
/// Horizontal axis — digit cursor movement.
pub const JOY_X_ADC_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Dispenser servo (continuous-rotation, hobby PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM output for the dispenser servo.
pub const SERVO_PWM_GPIO: i32 = 20;
/// PWM counter period the servo duty levels are expressed against.
pub const SERVO_PWM_PERIOD: u32 = 20_000;
/// Servo PWM frequency (standard 50 Hz hobby-servo frame).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

// ---------------------------------------------------------------------------
// Feedback outputs
// ---------------------------------------------------------------------------

/// Piezo buzzer, driven as a bit-banged square wave.
pub const BUZZER_GPIO: i32 = 10;
/// WS2812 data line for the 5x5 indicator matrix.
pub const MATRIX_GPIO: i32 = 7;
/// Number of LEDs in the indicator matrix.
pub const MATRIX_PIXELS: usize = 25;

// ---------------------------------------------------------------------------
// I2C bus (SSD1306 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// I2C address of the SSD1306 display.
pub const OLED_I2C_ADDR: u8 = 0x3C;
/// I2C bus speed for the display (400 kHz fast mode).
pub const I2C_FREQ_HZ: u32 = 400_000;
