// FocusDock — UART Command Console
//
// Non-blocking byte intake over UART1, line assembly via serial::LineBuffer.
// Parsing and validation live in the serial module; this only moves bytes.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;

use crate::serial::{LineBuffer, ParseError};

pub struct Console<'d> {
    uart: UartDriver<'d>,
    line: LineBuffer,
}

impl<'d> Console<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self {
            uart,
            line: LineBuffer::new(),
        }
    }

    /// Drain whatever bytes have arrived; returns the first completed
    /// line, if any. Called once per control-loop iteration, which is
    /// plenty for a human-typed protocol.
    pub fn poll_line(&mut self) -> Option<Result<String, ParseError>> {
        let mut byte = [0u8; 1];
        while let Ok(1) = self.uart.read(&mut byte, NON_BLOCK) {
            if let Some(line) = self.line.push(byte[0]) {
                return Some(line);
            }
        }
        None
    }

    pub fn write_line(&mut self, text: &str) {
        let _ = self.uart.write(text.as_bytes());
        let _ = self.uart.write(b"\r\n");
    }
}
