// FocusDock — Cooperative Control Loop
//
// Single-threaded scheduler: a base tick (~100 Hz) that always drains the
// console and samples the button, plus independently-gated periodic tasks
// (presence, phone, alert toggle, display refresh). The encoder edge ISR
// is the only concurrency in the system. All polling cadences are defined
// here — the session controller is cadence-agnostic and reacts to
// whatever readings it is handed.

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::config::*;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::console::Console;
use crate::drivers::display::OledDisplay;
use crate::drivers::phone::PhoneSensor;
use crate::drivers::relay::Relay;
use crate::drivers::rtc::Rtc;
use crate::drivers::ultrasonic::Ultrasonic;
use crate::encoder;
use crate::events::{ConsoleCommand, RtcTime};
use crate::input::ButtonClassifier;
use crate::serial;
use crate::session::SessionController;

/// Periodic task gate: a (last-run, interval) pair. `ready` answers "has
/// the interval elapsed?" and re-arms when it has; a stalled caller gets
/// one catch-up run, not a burst.
pub struct Cadence {
    interval_ms: u64,
    last_run_ms: u64,
}

impl Cadence {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: 0,
        }
    }

    pub fn ready(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_run_ms) >= self.interval_ms {
            self.last_run_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// The main control loop. Per iteration, in order: console intake, button
/// classification, state-machine evaluation, actuation, display snapshot —
/// so a refresh always reflects the state computed that same tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    button: PinDriver<'static, AnyInputPin, Input>,
    mut sonar: Ultrasonic<'static>,
    phone: PhoneSensor<'static>,
    mut relay: Relay<'static>,
    mut buzzer: Buzzer<'static>,
    mut display: OledDisplay,
    rtc: Rtc,
    mut console: Console<'static>,
) -> ! {
    log::info!("Control loop started");

    let mut session = SessionController::new();
    let mut classifier = ButtonClassifier::new(crate::now_ms());

    let mut presence_poll = Cadence::new(PRESENCE_POLL_MS);
    let mut phone_poll = Cadence::new(PHONE_POLL_MS);
    let mut alert_toggle = Cadence::new(ALERT_TOGGLE_MS);
    let mut display_refresh = Cadence::new(DISPLAY_REFRESH_MS);

    // Transient console/long-press feedback for the display footer.
    let mut status: Option<(String, u64)> = None;

    loop {
        let now = crate::now_ms();

        // 1. Console intake (line-oriented RTC commands).
        if let Some(line) = console.poll_line() {
            let reply = match line.and_then(|l| serial::parse_line(&l)) {
                Ok(None) => None, // blank line
                Ok(Some(cmd)) => Some(execute_command(cmd, &rtc)),
                Err(e) => Some(format!("ERR {e}")),
            };
            if let Some(reply) = reply {
                console.write_line(&reply);
                status = Some((reply, now + STATUS_MESSAGE_MS));
            }
        }

        // 2. Button sample → classifier → state machine.
        let pressed = button.is_low(); // pull-up, active LOW
        if let Some(event) = classifier.update(pressed, now) {
            if session.on_button(event, now, encoder::count()).is_some() {
                // Long press: clock readout onto the display, no state change.
                status = Some((read_clock(&rtc), now + STATUS_MESSAGE_MS));
            }
        }

        // 3. Encoder position (only moves the setting while in SetTimer).
        session.on_encoder(encoder::count());

        // 4. Presence sampling.
        if presence_poll.ready(now) {
            let present = sonar
                .measure_cm()
                .map(|cm| cm < PRESENCE_THRESHOLD_CM)
                .unwrap_or(false); // no echo → absent, fail toward lamp-off
            session.set_presence(present);
        }

        // 5. Phone sampling, only while the controller cares.
        if session.wants_phone_polling() && phone_poll.ready(now) {
            session.set_phone_present(phone.phone_present(), now);
        }

        // 6. Time-driven transitions (deadline expiry, cancel screen).
        session.tick(now);

        // 7. Actuation. A cancel must land within this same tick.
        relay.set(session.lamp_on());
        if session.alert_requested() {
            if alert_toggle.ready(now) {
                buzzer.toggle();
            }
        } else {
            buzzer.silence();
        }

        // 8. Display refresh.
        if matches!(&status, Some((_, until)) if now >= *until) {
            status = None;
        }
        if display_refresh.ready(now) {
            let time = rtc.read_time().ok();
            let snap = session.snapshot(now);
            let message = status.as_ref().map(|(text, _)| text.as_str());
            if let Err(e) = display.render(&snap, time.as_ref(), message) {
                log::warn!("Display refresh failed: {e}");
            }
        }

        thread::sleep(Duration::from_millis(CONTROL_TICK_MS));
    }
}

fn execute_command(cmd: ConsoleCommand, rtc: &Rtc) -> String {
    match cmd {
        ConsoleCommand::Read => read_clock(rtc),
        ConsoleCommand::Set(time) => apply_set(rtc, &time),
        ConsoleCommand::SetNow => apply_set(rtc, &build_time()),
    }
}

fn apply_set(rtc: &Rtc, time: &RtcTime) -> String {
    match rtc.set_time(time) {
        Ok(()) => format!(
            "OK {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            time.year, time.month, time.day, time.hour, time.minute, time.second
        ),
        Err(e) => {
            log::warn!("RTC set failed: {e}");
            "ERR rtc unavailable".to_string()
        }
    }
}

fn read_clock(rtc: &Rtc) -> String {
    match rtc.read_time() {
        Ok(t) => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            t.year, t.month, t.day, t.hour, t.minute, t.second
        ),
        Err(e) => {
            log::warn!("RTC read failed: {e}");
            "ERR rtc unavailable".to_string()
        }
    }
}

/// SETNOW stamps the RTC with the wall clock of the machine that built
/// this firmware — coarse, but enough to revive a dead clock.
fn build_time() -> RtcTime {
    RtcTime::from_unix_epoch(env!("FOCUSDOCK_BUILD_EPOCH").parse().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_gates_until_interval_elapsed() {
        let mut c = Cadence::new(200);
        assert!(c.ready(1_000));
        assert!(!c.ready(1_010));
        assert!(!c.ready(1_199));
        assert!(c.ready(1_200));
        assert!(!c.ready(1_390));
        assert!(c.ready(1_400));
    }

    #[test]
    fn cadence_missed_intervals_do_not_burst() {
        let mut c = Cadence::new(100);
        assert!(c.ready(1_000));
        // A long stall earns exactly one catch-up run.
        assert!(c.ready(5_000));
        assert!(!c.ready(5_010));
        assert!(!c.ready(5_099));
        assert!(c.ready(5_100));
    }
}
