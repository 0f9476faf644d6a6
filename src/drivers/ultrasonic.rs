// FocusDock — HC-SR04 Presence Sampler
//
// Classic trigger/echo pulse timing with µs resolution. Both waits are
// bounded, so a disconnected or out-of-range sensor costs at most ~35 ms
// per poll and reports the no-echo sentinel instead of an error — the
// controller treats that as "absent".

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};

use crate::config::{SONAR_PULSE_TIMEOUT_US, SONAR_START_TIMEOUT_US};

/// Round-trip microseconds per centimetre at room temperature.
const US_PER_CM: f32 = 58.0;

pub struct Ultrasonic<'d> {
    trig: PinDriver<'d, AnyOutputPin, Output>,
    echo: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> Ultrasonic<'d> {
    pub fn new(
        trig: PinDriver<'d, AnyOutputPin, Output>,
        echo: PinDriver<'d, AnyInputPin, Input>,
    ) -> Self {
        Self { trig, echo }
    }

    /// One distance measurement in centimetres; `None` is the no-echo
    /// sentinel (nothing in range, or sensor missing).
    pub fn measure_cm(&mut self) -> Option<f32> {
        // 10 µs trigger pulse starts the ping.
        let _ = self.trig.set_high();
        Ets::delay_us(10);
        let _ = self.trig.set_low();

        // Wait for the echo line to go high…
        let t0 = now_us();
        while self.echo.is_low() {
            if now_us() - t0 > SONAR_START_TIMEOUT_US {
                return None;
            }
        }

        // …then time how long it stays there.
        let pulse_start = now_us();
        while self.echo.is_high() {
            if now_us() - pulse_start > SONAR_PULSE_TIMEOUT_US {
                return None;
            }
        }

        let width_us = now_us() - pulse_start;
        Some(width_us as f32 / US_PER_CM)
    }
}

fn now_us() -> u64 {
    unsafe { esp_idf_sys::esp_timer_get_time() as u64 }
}
