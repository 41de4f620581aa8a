//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to               |
//! |------------|---------------|---------------------------|
//! | `hardware` | InputPort     | joystick ADC, buttons     |
//! |            | ActuatorPort  | servo PWM, buzzer GPIO    |
//! |            | IndicatorPort | WS2812 matrix over RMT    |
//! | `display`  | DisplayPort   | SSD1306 OLED over I2C     |
//! | `log_sink` | EventSink     | serial log output         |
//! | `time`     | —             | ESP high-resolution timer |

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod time;
