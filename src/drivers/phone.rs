// FocusDock — Phone-Cradle IR Sensor
//
// Reflective IR module watching the cradle slot. Output polarity differs
// between modules, so the raw level is corrected here and the rest of the
// firmware only ever sees "phone present: yes/no".

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::config::PHONE_IR_ACTIVE_LOW;

pub struct PhoneSensor<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> PhoneSensor<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>) -> Self {
        Self { pin }
    }

    pub fn phone_present(&self) -> bool {
        let level = self.pin.is_high();
        if PHONE_IR_ACTIVE_LOW {
            !level
        } else {
            level
        }
    }
}
