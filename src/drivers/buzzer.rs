// FocusDock — Alert Buzzer Driver
//
// On/off intent only — the control loop owns the toggle cadence, so the
// alert chirps instead of droning. No tone synthesis here.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct Buzzer<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
    on: bool,
}

impl<'d> Buzzer<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
        let _ = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    /// Flip the output — one alert chirp edge.
    pub fn toggle(&mut self) {
        self.set(!self.on);
    }

    pub fn silence(&mut self) {
        if self.on {
            self.set(false);
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
