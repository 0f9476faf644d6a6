// FocusDock — Button Classifier
//
// Debounced push-button handler emitting exactly one ShortPress or
// LongPress per physical press/release cycle. Sampled every control-loop
// tick (~100 Hz); the pin itself is read by the loop, so the classifier
// only ever sees `(level, timestamp)` pairs.

use crate::config::{DEBOUNCE_MS, LONG_PRESS_MS};
use crate::events::ButtonEvent;

pub struct ButtonClassifier {
    // Debounce state
    last_raw: bool,
    last_change_ms: u64,

    // Press tracking over accepted levels
    stable_pressed: bool,
    press_start_ms: Option<u64>,
}

impl ButtonClassifier {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_raw: false,
            last_change_ms: now_ms,
            stable_pressed: false,
            press_start_ms: None,
        }
    }

    /// Feed one raw sample. `pressed` is the polarity-corrected level
    /// (true = button held down). An event is returned only on an accepted
    /// release edge; everything shorter than the debounce window is noise.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        // ---- debounce filter ----
        if pressed != self.last_raw {
            self.last_raw = pressed;
            self.last_change_ms = now_ms;
        }
        if now_ms.saturating_sub(self.last_change_ms) < DEBOUNCE_MS {
            // Signal still settling — wait.
            return None;
        }

        // ---- accepted press edge ----
        if pressed && !self.stable_pressed {
            self.stable_pressed = true;
            self.press_start_ms = Some(now_ms);
            return None;
        }

        // ---- accepted release edge ----
        if !pressed && self.stable_pressed {
            self.stable_pressed = false;
            let hold_ms = self
                .press_start_ms
                .take()
                .map(|t| now_ms.saturating_sub(t))
                .unwrap_or(0);

            return Some(if hold_ms >= LONG_PRESS_MS {
                ButtonEvent::LongPress
            } else {
                ButtonEvent::ShortPress
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the classifier with 10 ms samples, collecting emitted events.
    fn run(samples: &[(u64, bool)]) -> Vec<ButtonEvent> {
        let mut b = ButtonClassifier::new(0);
        samples
            .iter()
            .filter_map(|&(now, level)| b.update(level, now))
            .collect()
    }

    /// `pressed` for `hold_ms`, then released, sampled every 10 ms with a
    /// settle tail long enough to pass the debounce window.
    fn clean_press(hold_ms: u64) -> Vec<(u64, bool)> {
        let mut s = Vec::new();
        let mut t = 0;
        while t <= hold_ms {
            s.push((t, true));
            t += 10;
        }
        for _ in 0..20 {
            s.push((t, false));
            t += 10;
        }
        s
    }

    #[test]
    fn clean_short_press_emits_one_short() {
        assert_eq!(run(&clean_press(300)), vec![ButtonEvent::ShortPress]);
    }

    #[test]
    fn clean_long_press_emits_one_long() {
        assert_eq!(run(&clean_press(2500)), vec![ButtonEvent::LongPress]);
    }

    #[test]
    fn hold_just_under_threshold_is_short() {
        // Press accepted at t=50 (debounce), released near 1900 — under 2 s.
        assert_eq!(run(&clean_press(1900)), vec![ButtonEvent::ShortPress]);
    }

    #[test]
    fn bounces_shorter_than_debounce_window_emit_nothing() {
        // 10–30 ms blips in both directions.
        let samples = [
            (0, false),
            (10, true),
            (30, false),
            (40, true),
            (60, false),
            (100, false),
            (200, false),
        ];
        assert_eq!(run(&samples), vec![]);
    }

    #[test]
    fn bouncy_release_still_emits_exactly_one_event() {
        let mut samples = vec![];
        // Solid 500 ms press…
        for t in (0..500).step_by(10) {
            samples.push((t, true));
        }
        // …then a bouncing release: brief re-contacts under 50 ms each.
        samples.extend([(500, false), (510, true), (530, false), (545, true), (555, false)]);
        for t in (560..800).step_by(10) {
            samples.push((t, false));
        }
        assert_eq!(run(&samples), vec![ButtonEvent::ShortPress]);
    }

    #[test]
    fn two_presses_emit_two_events() {
        let mut samples = clean_press(300);
        let offset = samples.last().unwrap().0 + 10;
        samples.extend(clean_press(2500).into_iter().map(|(t, l)| (t + offset, l)));
        assert_eq!(
            run(&samples),
            vec![ButtonEvent::ShortPress, ButtonEvent::LongPress]
        );
    }
}
