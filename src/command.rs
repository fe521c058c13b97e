//! Serial command grammar.
//!
//! A command is seven ASCII bytes: a command letter followed by six hex
//! digits. The only defined command is `S hh hh hh`, which sets the target
//! hue, saturation and value. Unknown letters are ignored and malformed hex
//! digits read as zero, so parsing never fails loudly.

use crate::colors::Hsv;
use heapless::Vec;

/// Length of a command buffer.
pub const COMMAND_LEN: usize = 7;

/// A raw command: letter plus six hex digits.
pub type CommandBuffer = [u8; COMMAND_LEN];

/// Letter of the set-color command.
const SET_COLOR: u8 = b'S';

/// Decoded command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Set the target color.
    SetColor(Hsv),
}

impl Command {
    /// Decodes a command buffer.
    ///
    /// Returns `None` for an unrecognized command letter.
    pub fn parse(buffer: &CommandBuffer) -> Option<Command> {
        match buffer[0] {
            SET_COLOR => Some(Command::SetColor(Hsv::from_bytes(
                hex_byte(buffer[1], buffer[2]),
                hex_byte(buffer[3], buffer[4]),
                hex_byte(buffer[5], buffer[6]),
            ))),
            _ => None,
        }
    }

    /// Encodes the command with lowercase hex digits.
    pub fn encode(&self) -> CommandBuffer {
        match self {
            Command::SetColor(color) => {
                let mut buffer = [SET_COLOR; COMMAND_LEN];
                for (digits, byte) in buffer[1..].chunks_exact_mut(2).zip(color.to_bytes()) {
                    digits[0] = to_hex(byte >> 4);
                    digits[1] = to_hex(byte & 0x0F);
                }
                buffer
            }
        }
    }
}

/// Decodes one hex digit. Anything other than `0-9`, `A-F` or `a-f` reads as 0.
pub fn hex_digit(ch: u8) -> u8 {
    match ch {
        b'0'..=b'9' => ch - b'0',
        b'A'..=b'F' => ch - b'A' + 10,
        b'a'..=b'f' => ch - b'a' + 10,
        _ => 0,
    }
}

fn hex_byte(high: u8, low: u8) -> u8 {
    (hex_digit(high) << 4) | hex_digit(low)
}

fn to_hex(nibble: u8) -> u8 {
    if nibble > 9 {
        b'a' + nibble - 10
    } else {
        b'0' + nibble
    }
}

/// Assembles command buffers from an unframed byte stream such as USB serial.
///
/// Every seven bytes form one command. A carriage return or line feed drops
/// whatever has been collected so far, so a terminal user can resync by
/// pressing enter.
#[derive(Debug, Default)]
pub struct LineReader {
    pending: Vec<u8, COMMAND_LEN>,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feeds one byte. Returns a buffer once seven bytes are collected.
    pub fn push(&mut self, byte: u8) -> Option<CommandBuffer> {
        if byte == b'\r' || byte == b'\n' {
            self.pending.clear();
            return None;
        }

        // Never full here: a full buffer is emitted and cleared below.
        let _ = self.pending.push(byte);
        if self.pending.is_full() {
            let mut buffer = [0; COMMAND_LEN];
            buffer.copy_from_slice(&self.pending);
            self.pending.clear();
            return Some(buffer);
        }
        None
    }

    /// Number of bytes collected toward the next command.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
