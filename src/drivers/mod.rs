// FocusDock — Peripheral Drivers

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod buzzer;
pub mod console;
pub mod display;
pub mod phone;
pub mod relay;
pub mod rtc;
pub mod ultrasonic;

/// Thread-safe handle to the shared I2C bus (OLED + DS3231).
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;
