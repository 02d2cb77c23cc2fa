//! Serial framing for the exchange maintenance port
//!
//! The exchange talks 9600 baud, 7 data bits, even parity, 2 stop bits with
//! no handshake. These settings are fixed by the hardware.
//!
//! Records are newline terminated. Some firmware pads the start of a record
//! with a NUL byte and the end with CR and spaces.

use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilder, StopBits};

/// Line speed of the maintenance port
pub const BAUD_RATE: u32 = 9600;

/// Record terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Longest record kept, terminator included
///
/// Real records are a few dozen bytes. Anything longer is line noise (a
/// wrong baud rate, a disconnected cable) and is skipped up to its terminator.
pub const MAX_RECORD_LEN: usize = 4096;

/// Character substituted for bytes outside 7-bit ASCII
const REPLACEMENT_CHAR: char = '?';

/// Build a serial port builder with the exchange's framing parameters
pub fn serial_builder(port_name: &str) -> SerialPortBuilder {
    tokio_serial::new(port_name, BAUD_RATE)
        .data_bits(DataBits::Seven)
        .parity(Parity::Even)
        .stop_bits(StopBits::Two)
        .flow_control(FlowControl::None)
}

/// Decode one raw record into a line
///
/// Returns `None` when nothing but padding and whitespace remains.
pub fn decode_line(raw: &[u8]) -> Option<String> {
    let text: String = raw
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT_CHAR })
        .collect();

    let line = text
        .trim_start_matches('\0')
        .trim_end_matches(|c| matches!(c, '\r' | '\n' | ' '));

    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}
