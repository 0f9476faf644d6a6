// FocusDock — Rotary Encoder Capture
//
// Quadrature decoding in interrupt context. Every edge on either phase
// line forms a 4-bit transition code (previous AB bits ++ current AB bits)
// that is looked up in the standard quadrature table; valid codes nudge a
// process-wide counter, bounce/skip codes change nothing. The handler is
// O(1) and allocation-free, and the only datum it shares with the control
// loop is the atomic counter.

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use crate::config::{PIN_ENCODER_A, PIN_ENCODER_B};

/// Raw position counter. Written only by the edge ISR; the control loop
/// reads it with a single atomic load (4 ticks per mechanical detent).
static COUNT: AtomicI32 = AtomicI32::new(0);

/// Previous 2-bit AB phase code, owned by the ISR between edges.
static PREV_AB: AtomicU8 = AtomicU8::new(0);

/// Classify a 4-bit quadrature transition code: +1 / −1 for the eight
/// valid transitions, 0 for bounce or skipped states.
pub fn decode(transition: u8) -> i32 {
    match transition & 0b1111 {
        0b0001 | 0b0111 | 0b1110 | 0b1000 => 1,
        0b0010 | 0b1011 | 0b1101 | 0b0100 => -1,
        _ => 0,
    }
}

/// Stateful decoder over a stream of AB phase samples. The ISR runs the
/// same computation on the statics above; this form exists so the table
/// logic is testable without hardware.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    prev_ab: u8,
}

impl Decoder {
    pub fn new(ab: u8) -> Self {
        Self { prev_ab: ab & 0b11 }
    }

    /// Feed the current AB phase bits, returning the position delta.
    pub fn step(&mut self, ab: u8) -> i32 {
        let ab = ab & 0b11;
        let delta = decode(self.prev_ab << 2 | ab);
        self.prev_ab = ab;
        delta
    }
}

/// Current raw counter value.
pub fn count() -> i32 {
    COUNT.load(Ordering::Relaxed)
}

/// Configure both phase pins (input, pull-up, any-edge interrupt) and
/// attach the edge handler. Must be called once before the control loop.
pub fn install() -> anyhow::Result<()> {
    unsafe {
        for pin in [PIN_ENCODER_A, PIN_ENCODER_B] {
            esp_idf_sys::gpio_set_direction(pin, esp_idf_sys::gpio_mode_t_GPIO_MODE_INPUT);
            esp_idf_sys::gpio_set_pull_mode(pin, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY);
            esp_idf_sys::gpio_set_intr_type(pin, esp_idf_sys::gpio_int_type_t_GPIO_INTR_ANYEDGE);
        }

        // The ISR service may already be installed by another subsystem.
        let ret = esp_idf_sys::gpio_install_isr_service(0);
        if ret != esp_idf_sys::ESP_OK && ret != esp_idf_sys::ESP_ERR_INVALID_STATE {
            anyhow::bail!("gpio_install_isr_service failed ({ret})");
        }

        // Seed the previous phase code from the resting position so the
        // first real edge decodes as a valid transition.
        PREV_AB.store(read_ab(), Ordering::Relaxed);

        esp_idf_sys::esp!(esp_idf_sys::gpio_isr_handler_add(
            PIN_ENCODER_A,
            Some(on_edge),
            core::ptr::null_mut(),
        ))?;
        esp_idf_sys::esp!(esp_idf_sys::gpio_isr_handler_add(
            PIN_ENCODER_B,
            Some(on_edge),
            core::ptr::null_mut(),
        ))?;
    }
    Ok(())
}

fn read_ab() -> u8 {
    // SAFETY: gpio_get_level is callable from any context per ESP-IDF.
    let a = unsafe { esp_idf_sys::gpio_get_level(PIN_ENCODER_A) } as u8;
    let b = unsafe { esp_idf_sys::gpio_get_level(PIN_ENCODER_B) } as u8;
    a << 1 | b
}

/// Edge handler, interrupt context: read both phases, decode, bump the
/// counter. Touches nothing but the two statics.
unsafe extern "C" fn on_edge(_arg: *mut core::ffi::c_void) {
    let ab = read_ab();
    let prev = PREV_AB.swap(ab, Ordering::Relaxed);
    let delta = decode(prev << 2 | ab);
    if delta != 0 {
        COUNT.fetch_add(delta, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        for code in [0b0001, 0b0111, 0b1110, 0b1000] {
            assert_eq!(decode(code), 1, "code {code:04b}");
        }
        for code in [0b0010, 0b1011, 0b1101, 0b0100] {
            assert_eq!(decode(code), -1, "code {code:04b}");
        }
        for code in [0b0000, 0b0101, 0b1010, 0b1111, 0b0011, 0b1100, 0b0110, 0b1001] {
            assert_eq!(decode(code), 0, "code {code:04b}");
        }
    }

    #[test]
    fn clockwise_detent_is_plus_four() {
        // One full detent CW: 00 → 01 → 11 → 10 → 00.
        let mut dec = Decoder::new(0b00);
        let total: i32 = [0b01, 0b11, 0b10, 0b00].iter().map(|&ab| dec.step(ab)).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn counterclockwise_detent_is_minus_four() {
        let mut dec = Decoder::new(0b00);
        let total: i32 = [0b10, 0b11, 0b01, 0b00].iter().map(|&ab| dec.step(ab)).sum();
        assert_eq!(total, -4);
    }

    #[test]
    fn bounce_on_one_line_cancels_out() {
        // A bounces: 00 → 10 → 00 → 10 → 00. Each pair is −1 then +1.
        let mut dec = Decoder::new(0b00);
        let total: i32 = [0b10, 0b00, 0b10, 0b00].iter().map(|&ab| dec.step(ab)).sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn repeated_sample_is_ignored() {
        // Sampling jitter can re-deliver the same phase code; 00→00 etc.
        // sit on the table diagonal and must not move the counter.
        let mut dec = Decoder::new(0b01);
        assert_eq!(dec.step(0b01), 0);
        assert_eq!(dec.step(0b01), 0);
    }

    #[test]
    fn mixed_sequence_sums_increments_minus_decrements() {
        // Two detents CW, one CCW.
        let seq = [
            0b01, 0b11, 0b10, 0b00, // +4
            0b01, 0b11, 0b10, 0b00, // +4
            0b10, 0b11, 0b01, 0b00, // −4
        ];
        let mut dec = Decoder::new(0b00);
        let total: i32 = seq.iter().map(|&ab| dec.step(ab)).sum();
        assert_eq!(total, 4);
    }
}
