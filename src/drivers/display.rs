// FocusDock — OLED Display Driver
//
// SSD1306 128×64 over the shared I2C bus, register-level with a local
// framebuffer. Rendering goes through embedded-graphics; the session core
// hands over snapshots and never formats pixels itself.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Text},
};

use crate::config::{
    DISPLAY_BUFFER_SIZE, I2C_ADDR_OLED, I2C_TIMEOUT_TICKS, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use crate::drivers::SharedBus;
use crate::events::{DisplaySnapshot, RtcTime, SessionState};

// Control bytes: a command stream vs. a framebuffer data stream.
const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

pub struct OledDisplay {
    bus: SharedBus,
    buffer: [u8; DISPLAY_BUFFER_SIZE],
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self {
            bus,
            buffer: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    /// Probe the controller with a NOP command.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_OLED, &[CTRL_COMMAND, 0xE3], I2C_TIMEOUT_TICKS)
            .is_ok()
    }

    /// Standard SSD1306 charge-pump init sequence, 128×64 variant.
    pub fn init(&mut self) -> anyhow::Result<()> {
        for cmd in [
            &[0xAE][..],       // display off
            &[0xD5, 0x80],     // clock divide
            &[0xA8, 0x3F],     // multiplex 64
            &[0xD3, 0x00],     // display offset
            &[0x40],           // start line 0
            &[0x8D, 0x14],     // charge pump on
            &[0x20, 0x00],     // horizontal addressing
            &[0xA1],           // segment remap
            &[0xC8],           // COM scan direction
            &[0xDA, 0x12],     // COM pins
            &[0x81, 0xCF],     // contrast
            &[0xD9, 0xF1],     // precharge
            &[0xDB, 0x40],     // VCOM detect
            &[0xA4],           // resume from RAM
            &[0xA6],           // normal (non-inverted)
            &[0xAF],           // display on
        ] {
            self.command(cmd)?;
        }
        self.clear();
        self.flush()?;
        log::info!("SSD1306 initialised");
        Ok(())
    }

    fn command(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut packet = [0u8; 4];
        packet[0] = CTRL_COMMAND;
        packet[1..=bytes.len()].copy_from_slice(bytes);
        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_OLED, &packet[..=bytes.len()], I2C_TIMEOUT_TICKS)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0);
    }

    /// Push the framebuffer to the panel in one data write.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        // Reset the addressing window to the full panel.
        self.command(&[0x21, 0x00, (SCREEN_WIDTH - 1) as u8])?;
        self.command(&[0x22, 0x00, (SCREEN_HEIGHT / 8 - 1) as u8])?;

        let mut packet = [0u8; DISPLAY_BUFFER_SIZE + 1];
        packet[0] = CTRL_DATA;
        packet[1..].copy_from_slice(&self.buffer);
        let mut bus = self.bus.lock().unwrap();
        bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        Ok(())
    }

    pub fn turn_off(&self) -> anyhow::Result<()> {
        self.command(&[0xAE])
    }

    fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= SCREEN_WIDTH as i32 || y >= SCREEN_HEIGHT as i32 {
            return;
        }
        let index = x as usize + (y as usize / 8) * SCREEN_WIDTH as usize;
        let bit = 1 << (y as usize % 8);
        if on {
            self.buffer[index] |= bit;
        } else {
            self.buffer[index] &= !bit;
        }
    }

    // -----------------------------------------------------------------
    // Screens
    // -----------------------------------------------------------------

    /// Boot splash.
    pub fn show_splash(&mut self) -> anyhow::Result<()> {
        self.clear();
        let big = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let _ = Text::with_alignment("FocusDock", Point::new(64, 38), big, Alignment::Center)
            .draw(self);
        self.flush()
    }

    /// Self-test result screen shown once during boot.
    pub fn show_boot_status(&mut self, oled_ok: bool, rtc_ok: bool) -> anyhow::Result<()> {
        self.clear();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::new("Self-test", Point::new(0, 10), style).draw(self);
        let oled = if oled_ok { "OLED ... ok" } else { "OLED ... FAIL" };
        let rtc = if rtc_ok { "RTC  ... ok" } else { "RTC  ... FAIL" };
        let _ = Text::new(oled, Point::new(0, 30), style).draw(self);
        let _ = Text::new(rtc, Point::new(0, 44), style).draw(self);
        self.flush()
    }

    /// One full refresh: header (state + wall clock), the state's main
    /// line, and a footer (phone/lamp markers, or a transient status
    /// message from the console).
    pub fn render(
        &mut self,
        snap: &DisplaySnapshot,
        time: Option<&RtcTime>,
        status: Option<&str>,
    ) -> anyhow::Result<()> {
        self.clear();
        let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let big = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);

        // Header
        let _ = Text::new(snap.state.label(), Point::new(0, 10), small).draw(self);
        let clock = match time {
            Some(t) => format!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second),
            None => "--:--:--".to_string(),
        };
        let _ = Text::with_alignment(&clock, Point::new(127, 10), small, Alignment::Right)
            .draw(self);

        // Main line
        let main = match snap.state {
            SessionState::Idle => format!("{} min", snap.timer_minutes),
            SessionState::SetTimer => format!("> {} min", snap.timer_minutes),
            SessionState::WaitPhone => "Dock phone".to_string(),
            SessionState::Countdown => match snap.remaining {
                Some((m, s)) => format!("{m}:{s:02}"),
                None => String::new(),
            },
            SessionState::Aborted => "Cancelled".to_string(),
        };
        let _ = Text::with_alignment(&main, Point::new(64, 40), big, Alignment::Center)
            .draw(self);

        // Footer
        match status {
            Some(msg) => {
                let _ = Text::new(msg, Point::new(0, 60), small).draw(self);
            }
            None => {
                let phone = if snap.phone_present { "phone IN" } else { "phone OUT" };
                let _ = Text::new(phone, Point::new(0, 60), small).draw(self);
                if snap.lamp_on {
                    let _ = Text::with_alignment("*", Point::new(127, 60), small, Alignment::Right)
                        .draw(self);
                }
            }
        }

        self.flush()
    }
}

impl DrawTarget for OledDisplay {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }
}

impl OriginDimensions for OledDisplay {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
