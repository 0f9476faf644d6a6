// FocusDock — DS3231 RTC Driver
//
// Register-level driver over the shared I2C bus. The DS3231 stores time
// as BCD in seven consecutive registers; the century flag in the month
// register extends the two-digit year to 2000–2199, of which this
// firmware uses 2000–2099.

use crate::config::{I2C_ADDR_DS3231, I2C_TIMEOUT_TICKS};
use crate::drivers::SharedBus;
use crate::events::RtcTime;

// DS3231 register addresses
const REG_SECONDS: u8 = 0x00; // Start of the 7-byte time burst
const REG_STATUS: u8 = 0x0F;

const MONTH_CENTURY_BIT: u8 = 0x80;
const STATUS_OSF_BIT: u8 = 0x80; // oscillator-stop flag: time is suspect

pub struct Rtc {
    bus: SharedBus,
}

impl Rtc {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus }
    }

    /// Verify the device answers on the bus.
    pub fn is_connected(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        let mut buf = [0u8; 1];
        bus.write_read(I2C_ADDR_DS3231, &[REG_STATUS], &mut buf, I2C_TIMEOUT_TICKS)
            .is_ok()
    }

    /// True when the oscillator has stopped since the last set — the time
    /// registers still read back, but their contents are meaningless.
    pub fn lost_time(&self) -> bool {
        let mut bus = self.bus.lock().unwrap();
        let mut buf = [0u8; 1];
        match bus.write_read(I2C_ADDR_DS3231, &[REG_STATUS], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] & STATUS_OSF_BIT != 0,
            Err(_) => true,
        }
    }

    /// Burst-read the seven time registers.
    pub fn read_time(&self) -> anyhow::Result<RtcTime> {
        let mut bus = self.bus.lock().unwrap();
        let mut raw = [0u8; 7];
        bus.write_read(I2C_ADDR_DS3231, &[REG_SECONDS], &mut raw, I2C_TIMEOUT_TICKS)?;

        let century = raw[5] & MONTH_CENTURY_BIT != 0;
        Ok(RtcTime {
            second: bcd_to_bin(raw[0] & 0x7F),
            minute: bcd_to_bin(raw[1] & 0x7F),
            hour: bcd_to_bin(raw[2] & 0x3F), // 24-hour mode
            // raw[3] = day of week — unused
            day: bcd_to_bin(raw[4] & 0x3F),
            month: bcd_to_bin(raw[5] & 0x1F),
            year: 2000 + if century { 100 } else { 0 } + bcd_to_bin(raw[6]) as u16,
        })
    }

    /// Write all seven time registers and clear the oscillator-stop flag.
    /// The caller validates ranges; this only encodes.
    pub fn set_time(&self, time: &RtcTime) -> anyhow::Result<()> {
        let mut bus = self.bus.lock().unwrap();

        let century = time.year >= 2100;
        let yy = (time.year % 100) as u8;
        let month = bin_to_bcd(time.month) | if century { MONTH_CENTURY_BIT } else { 0 };

        bus.write(
            I2C_ADDR_DS3231,
            &[
                REG_SECONDS,
                bin_to_bcd(time.second),
                bin_to_bcd(time.minute),
                bin_to_bcd(time.hour),
                1, // day of week — unused, but the register must be valid
                bin_to_bcd(time.day),
                month,
                bin_to_bcd(yy),
            ],
            I2C_TIMEOUT_TICKS,
        )?;

        // Clear OSF so lost_time() reflects the fresh setting.
        bus.write(I2C_ADDR_DS3231, &[REG_STATUS, 0x00], I2C_TIMEOUT_TICKS)?;

        log::info!(
            "RTC set to {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            time.year, time.month, time.day, time.hour, time.minute, time.second
        );
        Ok(())
    }
}

fn bcd_to_bin(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

fn bin_to_bcd(bin: u8) -> u8 {
    (bin / 10) << 4 | (bin % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_round_trip() {
        for v in 0..=99 {
            assert_eq!(bcd_to_bin(bin_to_bcd(v)), v);
        }
        assert_eq!(bin_to_bcd(59), 0x59);
        assert_eq!(bcd_to_bin(0x23), 23);
    }
}
