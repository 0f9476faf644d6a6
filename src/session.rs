// FocusDock — Session Controller
//
// The five-state study-session state machine. Owns the timer setting and
// the countdown deadline, consumes button events, the raw encoder count
// and the periodic presence/phone readings, and exposes lamp/alert
// intents plus display snapshots. Cadence-agnostic: the control loop
// decides when readings arrive, the controller only reacts to them.

use crate::config::{
    ABORTED_SHOW_MS, DEFAULT_TIMER_MINUTES, ENCODER_TICKS_PER_MINUTE, TIMER_MAX_MINUTES,
    TIMER_MIN_MINUTES,
};
use crate::countdown::Deadline;
use crate::events::{ButtonEvent, DisplaySnapshot, SessionState};

/// Internal workflow phase. The countdown deadline lives inside the
/// `Countdown` variant so it cannot exist in any other state, and the
/// encoder base only exists while the knob is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    SetTimer { encoder_base: i32 },
    WaitPhone,
    Countdown { deadline: Deadline },
    Aborted { since_ms: u64 },
}

pub struct SessionController {
    phase: Phase,
    timer_minutes: u16,
    presence: bool,
    phone_present: bool,
    lamp_on: bool,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            timer_minutes: DEFAULT_TIMER_MINUTES,
            presence: false,
            phone_present: false,
            lamp_on: false,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::SetTimer { .. } => SessionState::SetTimer,
            Phase::WaitPhone => SessionState::WaitPhone,
            Phase::Countdown { .. } => SessionState::Countdown,
            Phase::Aborted { .. } => SessionState::Aborted,
        }
    }

    pub fn timer_minutes(&self) -> u16 {
        self.timer_minutes
    }

    pub fn lamp_on(&self) -> bool {
        self.lamp_on
    }

    /// The alert sounds (toggled by the loop at its own cadence) whenever a
    /// countdown is running and the phone has left the cradle.
    pub fn alert_requested(&self) -> bool {
        matches!(self.phase, Phase::Countdown { .. }) && !self.phone_present
    }

    /// Phone sampling only matters while waiting for the phone or running.
    pub fn wants_phone_polling(&self) -> bool {
        matches!(self.phase, Phase::WaitPhone | Phase::Countdown { .. })
    }

    /// Handle a classified button press. `encoder_raw` is the live counter
    /// value, needed to re-seed the knob on SetTimer entry. A returned
    /// event is one the controller does not own and must be forwarded to
    /// the RTC collaborator (long presses, in any state).
    pub fn on_button(
        &mut self,
        event: ButtonEvent,
        now_ms: u64,
        encoder_raw: i32,
    ) -> Option<ButtonEvent> {
        match event {
            ButtonEvent::LongPress => return Some(event),
            ButtonEvent::ShortPress => match self.phase {
                Phase::Idle => {
                    // Seed the knob so its current position maps onto the
                    // current setting; rotation accumulated outside
                    // SetTimer is thereby discarded.
                    let base =
                        encoder_raw - self.timer_minutes as i32 * ENCODER_TICKS_PER_MINUTE;
                    self.phase = Phase::SetTimer { encoder_base: base };
                    log::info!("Session: set timer ({} min)", self.timer_minutes);
                }
                Phase::SetTimer { .. } => {
                    // Commit the setting. Any phone reading taken before
                    // this point is stale — require a fresh poll.
                    self.phone_present = false;
                    self.phase = Phase::WaitPhone;
                    log::info!("Session: armed, waiting for phone ({} min)", self.timer_minutes);
                }
                Phase::WaitPhone => {
                    self.phase = Phase::Idle;
                    log::info!("Session: disarmed");
                }
                Phase::Countdown { .. } => {
                    self.phase = Phase::Aborted { since_ms: now_ms };
                    self.lamp_on = false;
                    log::info!("Session: cancelled");
                }
                // The cancel screen absorbs presses until it expires.
                Phase::Aborted { .. } => {}
            },
        }
        None
    }

    /// Recompute the timer setting from the raw encoder counter. Only
    /// meaningful in SetTimer; rotation in any other state is ignored here
    /// (the raw counter keeps accumulating regardless).
    pub fn on_encoder(&mut self, encoder_raw: i32) {
        if let Phase::SetTimer { encoder_base } = self.phase {
            let minutes = (encoder_raw - encoder_base) / ENCODER_TICKS_PER_MINUTE;
            self.timer_minutes =
                minutes.clamp(TIMER_MIN_MINUTES as i32, TIMER_MAX_MINUTES as i32) as u16;
        }
    }

    /// Presence reading, supplied each presence-poll tick. A running
    /// countdown keeps the lamp on even with nobody at the desk — a
    /// mid-session absence must not darken it.
    pub fn set_presence(&mut self, present: bool) {
        self.presence = present;
        if present {
            self.lamp_on = true;
        } else if !matches!(self.phase, Phase::Countdown { .. }) {
            self.lamp_on = false;
        }
    }

    /// Phone-cradle reading, supplied each phone-poll tick. Placing the
    /// phone while armed starts the countdown.
    pub fn set_phone_present(&mut self, present: bool, now_ms: u64) {
        self.phone_present = present;
        if present && self.phase == Phase::WaitPhone {
            let duration_ms = self.timer_minutes as u64 * 60_000;
            self.phase = Phase::Countdown {
                deadline: Deadline::start(now_ms, duration_ms),
            };
            self.lamp_on = true;
            log::info!("Session: countdown started ({} min)", self.timer_minutes);
        }
    }

    /// Time-driven transitions: countdown expiry and the cancel-screen
    /// hold. Called every loop iteration.
    pub fn tick(&mut self, now_ms: u64) {
        match self.phase {
            Phase::Countdown { deadline } if deadline.is_elapsed(now_ms) => {
                self.phase = Phase::Idle;
                self.lamp_on = false;
                log::info!("Session: countdown complete");
            }
            Phase::Aborted { since_ms } if now_ms.saturating_sub(since_ms) >= ABORTED_SHOW_MS => {
                self.phase = Phase::Idle;
            }
            _ => {}
        }
    }

    pub fn snapshot(&self, now_ms: u64) -> DisplaySnapshot {
        DisplaySnapshot {
            state: self.state(),
            timer_minutes: self.timer_minutes,
            remaining: match self.phase {
                Phase::Countdown { deadline } => Some(deadline.remaining_mm_ss(now_ms)),
                _ => None,
            },
            phone_present: self.phone_present,
            lamp_on: self.lamp_on,
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: ButtonEvent = ButtonEvent::ShortPress;
    const LONG: ButtonEvent = ButtonEvent::LongPress;

    /// Walk a fresh controller into SetTimer with the given raw count.
    fn in_set_timer(encoder_raw: i32) -> SessionController {
        let mut s = SessionController::new();
        assert_eq!(s.on_button(SHORT, 0, encoder_raw), None);
        assert_eq!(s.state(), SessionState::SetTimer);
        s
    }

    #[test]
    fn full_session_flow() {
        let mut s = SessionController::new();
        assert_eq!(s.state(), SessionState::Idle);

        // Idle → SetTimer, knob at an arbitrary accumulated position.
        s.on_button(SHORT, 0, 123);

        // 40 raw ticks clockwise = +10 minutes on top of the default.
        s.on_encoder(123 + 40);
        assert_eq!(s.timer_minutes(), DEFAULT_TIMER_MINUTES + 10);

        // Commit → WaitPhone.
        s.on_button(SHORT, 1_000, 163);
        assert_eq!(s.state(), SessionState::WaitPhone);

        // Phone placed → Countdown for the configured duration.
        s.set_phone_present(true, 2_000);
        assert_eq!(s.state(), SessionState::Countdown);
        assert!(s.lamp_on());
        let snap = s.snapshot(2_000);
        assert_eq!(snap.remaining, Some(((DEFAULT_TIMER_MINUTES + 10) as u32, 0)));
    }

    #[test]
    fn timer_clamped_against_encoder_overshoot() {
        let mut s = in_set_timer(0);
        // Way past the top end…
        s.on_encoder(600 * 4 + 4000);
        assert_eq!(s.timer_minutes(), 600);
        // …and way below the bottom, including negative raw counts.
        s.on_encoder(-10_000);
        assert_eq!(s.timer_minutes(), 1);
    }

    #[test]
    fn encoder_ignored_outside_set_timer() {
        let mut s = SessionController::new();
        s.on_encoder(9_999);
        assert_eq!(s.timer_minutes(), DEFAULT_TIMER_MINUTES);

        // Rotation accumulated while Idle is discarded by the re-seed:
        // entering SetTimer at raw=9_999 still shows the default.
        s.on_button(SHORT, 0, 9_999);
        s.on_encoder(9_999);
        assert_eq!(s.timer_minutes(), DEFAULT_TIMER_MINUTES);
    }

    #[test]
    fn wait_phone_short_press_disarms() {
        let mut s = in_set_timer(0);
        s.on_button(SHORT, 0, 0);
        assert_eq!(s.state(), SessionState::WaitPhone);
        s.on_button(SHORT, 0, 0);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn arming_clears_stale_phone_reading() {
        let mut s = SessionController::new();
        // A reading left over from a previous session…
        s.set_phone_present(true, 0);
        s.on_button(SHORT, 0, 0); // → SetTimer
        s.on_button(SHORT, 0, 0); // → WaitPhone
        // …must not start the countdown before the next poll does.
        assert_eq!(s.state(), SessionState::WaitPhone);
        assert!(!s.snapshot(0).phone_present);
        s.set_phone_present(true, 100);
        assert_eq!(s.state(), SessionState::Countdown);
    }

    #[test]
    fn cancel_mid_countdown_is_immediate_and_transient() {
        let mut s = in_set_timer(0);
        s.on_button(SHORT, 0, 0);
        s.set_phone_present(true, 1_000);
        s.set_phone_present(false, 2_000);
        assert!(s.alert_requested());

        // One short press zeroes all actuation within the same tick.
        s.on_button(SHORT, 3_000, 0);
        assert_eq!(s.state(), SessionState::Aborted);
        assert!(!s.lamp_on());
        assert!(!s.alert_requested());

        // The cancel screen auto-expires back to Idle.
        s.tick(3_000 + ABORTED_SHOW_MS - 1);
        assert_eq!(s.state(), SessionState::Aborted);
        s.tick(3_000 + ABORTED_SHOW_MS);
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn countdown_expires_autonomously() {
        let mut s = in_set_timer(0);
        // Entry at raw=0 seeds the base at −default×4; wind down to 2 min.
        let raw = (2 - DEFAULT_TIMER_MINUTES as i32) * 4;
        s.on_encoder(raw);
        assert_eq!(s.timer_minutes(), 2);
        s.on_button(SHORT, 0, raw);
        s.set_phone_present(true, 10_000);

        s.tick(10_000 + 2 * 60_000 - 1);
        assert_eq!(s.state(), SessionState::Countdown);
        s.tick(10_000 + 2 * 60_000);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.lamp_on());
        assert!(!s.alert_requested());
    }

    #[test]
    fn alert_follows_phone_during_countdown_only() {
        let mut s = in_set_timer(0);
        s.on_button(SHORT, 0, 0);
        assert!(!s.alert_requested()); // WaitPhone: no alert, phone absent or not

        s.set_phone_present(true, 0);
        assert!(!s.alert_requested());
        s.set_phone_present(false, 1_000);
        assert!(s.alert_requested());
        s.set_phone_present(true, 2_000);
        assert!(!s.alert_requested());
    }

    #[test]
    fn lamp_override_during_countdown() {
        let mut s = in_set_timer(0);
        s.on_button(SHORT, 0, 0);
        s.set_phone_present(true, 0);

        // Student walks away mid-session: lamp stays on.
        s.set_presence(false);
        assert!(s.lamp_on());

        // The same reading while Idle turns it off.
        let mut idle = SessionController::new();
        idle.set_presence(true);
        assert!(idle.lamp_on());
        idle.set_presence(false);
        assert!(!idle.lamp_on());
    }

    #[test]
    fn long_press_forwarded_unchanged_in_any_state() {
        let mut s = SessionController::new();
        assert_eq!(s.on_button(LONG, 0, 0), Some(LONG));
        assert_eq!(s.state(), SessionState::Idle);

        let mut s = in_set_timer(0);
        assert_eq!(s.on_button(LONG, 0, 0), Some(LONG));
        assert_eq!(s.state(), SessionState::SetTimer);
        assert_eq!(s.timer_minutes(), DEFAULT_TIMER_MINUTES);
    }
}
