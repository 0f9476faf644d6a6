// FocusDock — Desk-Lamp Relay Driver
//
// Boolean on/off actuation, nothing more. The session controller decides
// when the lamp changes; this just moves the pin.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct Relay<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> Relay<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }

    /// Relay coil is active HIGH.
    pub fn set(&mut self, on: bool) {
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
