//! UART framing scanner.
//!
//! The companion controller frames each command as `'W' 'x' '|'` followed by
//! the seven command bytes. [`FrameScanner`] finds the signature in the byte
//! stream and collects the payload behind it.

use crate::command::{COMMAND_LEN, CommandBuffer};
use heapless::Vec;

/// Bytes that open a framed command.
pub const FRAME_SIGNATURE: [u8; 3] = *b"Wx|";

/// Where the scanner is within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// Looking for the first signature byte.
    Wait,
    /// Matched `W`, expecting `x`.
    Signature1,
    /// Matched `Wx`, expecting `|`.
    Signature2,
    /// Signature matched, collecting payload bytes.
    Payload,
}

/// Byte-at-a-time frame scanner.
///
/// A byte that breaks a partial signature match is not dropped: the scanner
/// falls back to [`ScanState::Wait`] and examines the same byte again, so
/// `"WWx|"` still opens a frame. Payload bytes are taken verbatim with no
/// escaping and no timeout.
#[derive(Debug)]
pub struct FrameScanner {
    state: ScanState,
    payload: Vec<u8, COMMAND_LEN>,
}

impl FrameScanner {
    pub const fn new() -> Self {
        Self {
            state: ScanState::Wait,
            payload: Vec::new(),
        }
    }

    /// Returns the current scan state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feeds one byte. Returns the payload once a frame is complete.
    pub fn push(&mut self, byte: u8) -> Option<CommandBuffer> {
        // Each pass either returns or falls back to `Wait`, which always returns.
        loop {
            match self.state {
                ScanState::Wait => {
                    if byte == FRAME_SIGNATURE[0] {
                        self.state = ScanState::Signature1;
                    }
                    return None;
                }
                ScanState::Signature1 => {
                    if byte == FRAME_SIGNATURE[1] {
                        self.state = ScanState::Signature2;
                        return None;
                    }
                    self.state = ScanState::Wait;
                }
                ScanState::Signature2 => {
                    if byte == FRAME_SIGNATURE[2] {
                        self.payload.clear();
                        self.state = ScanState::Payload;
                        return None;
                    }
                    self.state = ScanState::Wait;
                }
                ScanState::Payload => {
                    let _ = self.payload.push(byte);
                    if !self.payload.is_full() {
                        return None;
                    }

                    let mut buffer = [0; COMMAND_LEN];
                    buffer.copy_from_slice(&self.payload);
                    self.payload.clear();
                    self.state = ScanState::Wait;
                    return Some(buffer);
                }
            }
        }
    }
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}
