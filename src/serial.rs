// FocusDock — Console Command Parsing
//
// Line-buffered text protocol for the RTC: SETNOW, SET, READ. Everything
// here is pure over bytes/strings; the UART itself lives in
// drivers::console. Commands are range-validated before the control loop
// ever hands them to the RTC driver.

use std::fmt;

use crate::config::CONSOLE_LINE_MAX;
use crate::events::{ConsoleCommand, RtcTime};

// ---------------------------------------------------------------------------
// Errors — echoed back to the console verbatim
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    BadArgCount { expected: usize, got: usize },
    BadNumber(String),
    OutOfRange(&'static str),
    LineTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(cmd) => write!(f, "unknown command '{cmd}'"),
            Self::BadArgCount { expected, got } => {
                write!(f, "expected {expected} arguments, got {got}")
            }
            Self::BadNumber(tok) => write!(f, "not a number: '{tok}'"),
            Self::OutOfRange(field) => write!(f, "{field} out of range"),
            Self::LineTooLong => write!(f, "line too long"),
        }
    }
}

// ---------------------------------------------------------------------------
// Line Buffer
// ---------------------------------------------------------------------------

/// Accumulates console bytes into newline-terminated lines. CR is
/// swallowed (CRLF terminals), overlong lines are discarded whole and
/// reported once the terminator finally arrives.
pub struct LineBuffer {
    buf: String,
    overflowed: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(CONSOLE_LINE_MAX),
            overflowed: false,
        }
    }

    /// Feed one byte; returns a completed line (or the overflow error for
    /// it) when a newline is seen.
    pub fn push(&mut self, byte: u8) -> Option<Result<String, ParseError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let overflowed = self.overflowed;
                self.overflowed = false;
                let line = std::mem::take(&mut self.buf);
                if overflowed {
                    Some(Err(ParseError::LineTooLong))
                } else {
                    Some(Ok(line))
                }
            }
            _ => {
                if self.buf.len() >= CONSOLE_LINE_MAX {
                    self.overflowed = true;
                } else {
                    self.buf.push(byte as char);
                }
                None
            }
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse one console line. Blank lines are not commands and produce
/// nothing; everything else either parses completely or is rejected.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let mut tokens = line.split_ascii_whitespace();
    let Some(cmd) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = tokens.collect();

    match cmd {
        "SETNOW" => {
            expect_args(&args, 0)?;
            Ok(Some(ConsoleCommand::SetNow))
        }
        "READ" => {
            expect_args(&args, 0)?;
            Ok(Some(ConsoleCommand::Read))
        }
        "SET" => {
            expect_args(&args, 6)?;
            let time = RtcTime {
                year: field(args[0], "year", 2000, 2099)?,
                month: field(args[1], "month", 1, 12)? as u8,
                day: field(args[2], "day", 1, 31)? as u8,
                hour: field(args[3], "hour", 0, 23)? as u8,
                minute: field(args[4], "minute", 0, 59)? as u8,
                second: field(args[5], "second", 0, 59)? as u8,
            };
            Ok(Some(ConsoleCommand::Set(time)))
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn expect_args(args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ParseError::BadArgCount {
            expected,
            got: args.len(),
        })
    }
}

fn field(token: &str, name: &'static str, min: u16, max: u16) -> Result<u16, ParseError> {
    let value: u16 = token
        .parse()
        .map_err(|_| ParseError::BadNumber(token.to_string()))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_commands() {
        assert_eq!(parse_line("SETNOW"), Ok(Some(ConsoleCommand::SetNow)));
        assert_eq!(parse_line("READ"), Ok(Some(ConsoleCommand::Read)));
        assert_eq!(parse_line("  READ  "), Ok(Some(ConsoleCommand::Read)));
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn set_happy_path() {
        assert_eq!(
            parse_line("SET 2026 08 07 21 30 00"),
            Ok(Some(ConsoleCommand::Set(RtcTime {
                year: 2026,
                month: 8,
                day: 7,
                hour: 21,
                minute: 30,
                second: 0,
            })))
        );
    }

    #[test]
    fn set_rejects_every_out_of_range_field() {
        // The classic all-wrong line: nothing about it may reach the RTC.
        assert_eq!(
            parse_line("SET 1999 13 40 25 61 61"),
            Err(ParseError::OutOfRange("year"))
        );
        assert_eq!(
            parse_line("SET 2026 13 01 00 00 00"),
            Err(ParseError::OutOfRange("month"))
        );
        assert_eq!(
            parse_line("SET 2026 12 32 00 00 00"),
            Err(ParseError::OutOfRange("day"))
        );
        assert_eq!(
            parse_line("SET 2026 12 31 24 00 00"),
            Err(ParseError::OutOfRange("hour"))
        );
        assert_eq!(
            parse_line("SET 2026 12 31 23 60 00"),
            Err(ParseError::OutOfRange("minute"))
        );
        assert_eq!(
            parse_line("SET 2026 12 31 23 59 60"),
            Err(ParseError::OutOfRange("second"))
        );
    }

    #[test]
    fn set_range_edges_accepted() {
        assert!(parse_line("SET 2000 1 1 0 0 0").is_ok());
        assert!(parse_line("SET 2099 12 31 23 59 59").is_ok());
    }

    #[test]
    fn set_arg_count_and_number_errors() {
        assert_eq!(
            parse_line("SET 2026 08"),
            Err(ParseError::BadArgCount { expected: 6, got: 2 })
        );
        assert_eq!(
            parse_line("SETNOW please"),
            Err(ParseError::BadArgCount { expected: 0, got: 1 })
        );
        assert_eq!(
            parse_line("SET 2026 aug 07 21 30 00"),
            Err(ParseError::BadNumber("aug".to_string()))
        );
    }

    #[test]
    fn unknown_command_echoes_offender() {
        assert_eq!(
            parse_line("HELP"),
            Err(ParseError::UnknownCommand("HELP".to_string()))
        );
    }

    #[test]
    fn line_buffer_splits_on_newline_and_eats_cr() {
        let mut lb = LineBuffer::new();
        let mut lines = Vec::new();
        for b in b"READ\r\nSETNOW\n" {
            if let Some(line) = lb.push(*b) {
                lines.push(line);
            }
        }
        assert_eq!(lines, vec![Ok("READ".to_string()), Ok("SETNOW".to_string())]);
    }

    #[test]
    fn line_buffer_discards_overlong_lines() {
        let mut lb = LineBuffer::new();
        for _ in 0..500 {
            assert_eq!(lb.push(b'x'), None);
        }
        assert_eq!(lb.push(b'\n'), Some(Err(ParseError::LineTooLong)));
        // Buffer recovers for the next line.
        for b in b"READ" {
            assert_eq!(lb.push(*b), None);
        }
        assert_eq!(lb.push(b'\n'), Some(Ok("READ".to_string())));
    }
}
