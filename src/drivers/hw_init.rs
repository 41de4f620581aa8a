//! One-shot hardware peripheral initialization.
//!
//! Configures ADC channels, GPIO directions, the servo LEDC channel and
//! the WS2812 RMT channel using raw ESP-IDF sys calls.  Called once from
//! `main()` before the event loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed,
    RmtInitFailed(i32),
    IsrInstallFailed(i32),
    TimerInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed => write!(f, "LEDC timer/channel config failed"),
            Self::RmtInitFailed(rc) => write!(f, "RMT init failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::TimerInitFailed(rc) => write!(f, "control timer init failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_ledc();
        init_rmt()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to the joystick Y axis.
pub const ADC1_CH_JOY_Y: u32 = 0;
/// ADC1 channel wired to the joystick X axis.
pub const ADC1_CH_JOY_X: u32 = 1;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the event loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [ADC1_CH_JOY_Y, ADC1_CH_JOY_X] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (CH0=joy_y, CH1=joy_x)");
    Ok(())
}

/// Raw 12-bit sample from a joystick axis pin.
#[cfg(target_os = "espidf")]
pub fn adc_read_raw(gpio: i32) -> u16 {
    let channel = if gpio == pins::JOY_X_ADC_GPIO {
        ADC1_CH_JOY_X
    } else {
        ADC1_CH_JOY_Y
    };
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this
    // function is called; single-threaded main-loop access guaranteed.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

/// Simulation: every axis rests at centre.
#[cfg(not(target_os = "espidf"))]
pub fn adc_read_raw(_gpio: i32) -> u16 {
    2047
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let button_pins = [
        pins::FEED_BUTTON_GPIO,
        pins::MENU_BUTTON_GPIO,
        pins::CONFIRM_BUTTON_GPIO,
    ];

    for &pin in &button_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO inputs configured (buttons A/B/confirm)");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::BUZZER_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::BUZZER_GPIO, 0) };

    info!("hw_init: GPIO outputs configured (buzzer)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM (servo) ──────────────────────────────────────────

/// LEDC duty resolution for the servo channel.
#[cfg(target_os = "espidf")]
const SERVO_DUTY_BITS: u32 = 14;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() {
    // Timer 0: servo frame (50 Hz, 14-bit)
    // SAFETY: Called from single main-task context via init_peripherals().
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    unsafe {
        ledc_timer_config(&timer0);
    }

    unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::SERVO_PWM_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        });
    }

    info!("hw_init: LEDC configured (servo=CH0)");
}

/// Drive the servo with a duty expressed on the 20000-count frame.
#[cfg(target_os = "espidf")]
pub fn ledc_set_servo(duty_20k: u32) {
    // Rescale from the calibration frame to the LEDC counter range.
    let max = (1u32 << SERVO_DUTY_BITS) - 1;
    let duty = duty_20k.min(pins::SERVO_PWM_PERIOD) * max / pins::SERVO_PWM_PERIOD;
    // SAFETY: LEDC channel 0 was configured in init_ledc(); duty register
    // writes are race-free since only the main loop calls this function.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_servo(_duty_20k: u32) {}

// ── RMT (WS2812 matrix) ──────────────────────────────────────

// WS2812 bit timing in RMT ticks at 40 MHz (clk_div = 2, 25 ns/tick).
#[cfg(target_os = "espidf")]
const WS_T0H: u32 = 16; // 0.40 µs
#[cfg(target_os = "espidf")]
const WS_T0L: u32 = 34; // 0.85 µs
#[cfg(target_os = "espidf")]
const WS_T1H: u32 = 32; // 0.80 µs
#[cfg(target_os = "espidf")]
const WS_T1L: u32 = 18; // 0.45 µs

#[cfg(target_os = "espidf")]
unsafe fn init_rmt() -> Result<(), HwInitError> {
    let cfg = rmt_config_t {
        rmt_mode: rmt_mode_t_RMT_MODE_TX,
        channel: rmt_channel_t_RMT_CHANNEL_0,
        gpio_num: pins::MATRIX_GPIO,
        clk_div: 2,
        mem_block_num: 1,
        ..Default::default()
    };
    // SAFETY: one-shot configuration of a dedicated TX channel.
    unsafe {
        let ret = rmt_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::RmtInitFailed(ret));
        }
        let ret = rmt_driver_install(rmt_channel_t_RMT_CHANNEL_0, 0, 0);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::RmtInitFailed(ret));
        }
    }
    info!("hw_init: RMT configured (matrix=CH0)");
    Ok(())
}

/// Stream a 25-pixel GRB frame to the matrix (blocking).
#[cfg(target_os = "espidf")]
pub fn ws2812_write(frame: &[u32; pins::MATRIX_PIXELS]) {
    // One RMT item per bit, MSB first, 24 bits per pixel.
    let mut items = [0u32; pins::MATRIX_PIXELS * 24];
    let mut n = 0;
    for &px in frame {
        for bit in (8..32).rev() {
            let one = px & (1 << bit) != 0;
            let (high, low) = if one { (WS_T1H, WS_T1L) } else { (WS_T0H, WS_T0L) };
            // rmt_item32_t packed layout: duration0 | level0 | duration1 | level1.
            items[n] = high | (1 << 15) | (low << 16);
            n += 1;
        }
    }
    // SAFETY: the item words follow the packed rmt_item32_t register layout,
    // so the pointer cast reinterprets them losslessly.  Blocking write on a
    // channel owned exclusively by the main loop.
    unsafe {
        rmt_write_items(
            rmt_channel_t_RMT_CHANNEL_0,
            items.as_ptr().cast::<rmt_item32_t>(),
            n as i32,
            true,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ws2812_write(_frame: &[u32; pins::MATRIX_PIXELS]) {}

// ── Delays ────────────────────────────────────────────────────

/// Millisecond sleep (yields to the scheduler).
pub fn delay_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

/// Microsecond busy-wait (tone generation needs sub-ms precision).
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: esp_rom_delay_us is a calibrated busy loop; no side effects.
    unsafe {
        esp_rom_delay_us(us);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

// ── GPIO ISR service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::{button_isr_handler, ButtonId};
#[cfg(target_os = "espidf")]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is a counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn feed_gpio_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Feed, isr_now_ms());
    push_event(Event::FeedPressed);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn menu_gpio_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Menu, isr_now_ms());
    push_event(Event::MenuPressed);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn confirm_gpio_isr(_arg: *mut core::ffi::c_void) {
    // Confirm is sampled synchronously inside the menu/wizard states;
    // only the timestamp is recorded, no event is queued.
    button_isr_handler(ButtonId::Confirm, isr_now_ms());
}

/// Install the per-pin GPIO ISR service and register interrupt handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). ISR handlers registered
    // below are static functions that only store atomics / push events.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let handlers: [(i32, unsafe extern "C" fn(*mut core::ffi::c_void)); 3] = [
            (pins::FEED_BUTTON_GPIO, feed_gpio_isr),
            (pins::MENU_BUTTON_GPIO, menu_gpio_isr),
            (pins::CONFIRM_BUTTON_GPIO, confirm_gpio_isr),
        ];
        for (pin, handler) in handlers {
            gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_NEGEDGE);
            gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (feed, menu, confirm)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── Control-tick timer ────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn control_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::ControlTick);
}

/// Start the periodic control-tick timer.
#[cfg(target_os = "espidf")]
pub fn start_control_timer(interval_ms: u32) -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(control_tick_cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"control_tick".as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();
    // SAFETY: one-shot creation at boot; the callback only pushes events.
    unsafe {
        let ret = esp_timer_create(&args, &raw mut handle);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerInitFailed(ret));
        }
        let ret = esp_timer_start_periodic(handle, u64::from(interval_ms) * 1000);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerInitFailed(ret));
        }
    }
    Ok(())
}

/// Simulation: the host main loop sleeps and pushes ticks itself.
#[cfg(not(target_os = "espidf"))]
pub fn start_control_timer(_interval_ms: u32) -> Result<(), HwInitError> {
    Ok(())
}
