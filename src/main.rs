// FocusDock — Firmware Entry Point
//
// Boot sequence:
//   1. Initialise logging and take peripherals.
//   2. Bring up the shared I2C bus (OLED + DS3231).
//   3. Splash screen, then component self-test (OLED + RTC).
//   4. Install the rotary-encoder edge ISR.
//   5. Configure button, sensors, relay, buzzer, and the UART console.
//   6. Enter the cooperative control loop (never returns).
//
// A failed self-test degrades the affected feature (clock display, SET
// commands) but never blocks the session workflow.

mod config;
mod countdown;
mod drivers;
mod encoder;
mod events;
mod input;
mod scheduler;
mod serial;
mod session;

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use esp_idf_hal::uart::UartDriver;
use esp_idf_hal::units::Hertz;

use crate::config::*;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::console::Console;
use crate::drivers::display::OledDisplay;
use crate::drivers::phone::PhoneSensor;
use crate::drivers::relay::Relay;
use crate::drivers::rtc::Rtc;
use crate::drivers::ultrasonic::Ultrasonic;

// ---------------------------------------------------------------------------
// Utility: monotonic milliseconds since boot
// ---------------------------------------------------------------------------
pub fn now_ms() -> u64 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u64 }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
fn main() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("FocusDock firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // ---- I2C bus (shared between OLED and DS3231) -------------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // Leaked so both bus clients can hold a 'static handle — embedded
    // firmware never exits, the bus lives for the programme duration.
    let i2c_bus: &'static Mutex<I2cDriver<'static>> = Box::leak(Box::new(Mutex::new(i2c)));

    // ---- Boot sequence (display) ------------------------------------------
    let mut display = OledDisplay::new(i2c_bus);
    if let Err(e) = display.init() {
        log::error!("OLED init failed: {e} — continuing without display");
    }

    let _ = display.show_splash();
    thread::sleep(Duration::from_millis(BOOT_SPLASH_MS));

    // ---- Component self-test ----------------------------------------------
    let oled_ok = display.is_connected();
    let rtc = Rtc::new(i2c_bus);
    let rtc_ok = rtc.is_connected();

    let _ = display.show_boot_status(oled_ok, rtc_ok);
    thread::sleep(Duration::from_secs(1));

    if !oled_ok || !rtc_ok {
        // Continue anyway — the session workflow needs neither.
        log::warn!("Self-test degraded — OLED:{} RTC:{}", oled_ok, rtc_ok);
    }
    if rtc_ok && rtc.lost_time() {
        log::warn!("RTC has lost time — use SET/SETNOW on the console");
    }

    // ---- Rotary encoder edge ISR ------------------------------------------
    encoder::install()?;
    log::info!(
        "Encoder ISR installed on GPIO{}/GPIO{}",
        PIN_ENCODER_A,
        PIN_ENCODER_B
    );

    // ---- Input / sensor / actuation pins ----------------------------------
    let button = PinDriver::input(peripherals.pins.gpio9.downgrade_input())?;
    set_pullup(PIN_BUTTON);

    let phone_pin = PinDriver::input(peripherals.pins.gpio18.downgrade_input())?;
    set_pullup(PIN_PHONE_IR);
    let phone = PhoneSensor::new(phone_pin);

    let sonar = Ultrasonic::new(
        PinDriver::output(peripherals.pins.gpio8.downgrade_output())?,
        PinDriver::input(peripherals.pins.gpio10.downgrade_input())?,
    );

    let relay = Relay::new(PinDriver::output(peripherals.pins.gpio2.downgrade_output())?);
    let buzzer = Buzzer::new(PinDriver::output(peripherals.pins.gpio3.downgrade_output())?);

    // ---- UART command console ---------------------------------------------
    let uart_config = esp_idf_hal::uart::config::Config::new().baudrate(Hertz(CONSOLE_BAUD));
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio0, // TX
        peripherals.pins.gpio1, // RX
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let console = Console::new(uart);

    log::info!("Boot complete — entering control loop");

    // ---- Control loop (single-threaded, cooperative) -----------------------
    scheduler::run(button, sonar, phone, relay, buzzer, display, rtc, console)
}

/// Enable the internal pull-up on an input pin.  The downgraded pin type
/// loses the typed pull API, so this goes through the raw GPIO matrix call.
fn set_pullup(pin: i32) {
    unsafe {
        esp_idf_sys::gpio_set_pull_mode(pin, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY);
    }
}
