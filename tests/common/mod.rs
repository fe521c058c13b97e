//! Shared test infrastructure for lightstrip-sync integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::Cell;
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady};
use lightstrip_sync::{LedStrip, Millis, RadioQueue, Rgb24, TimeSource};

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<Millis>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(Millis(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u32) {
        let current = self.current_time.get();
        self.current_time.set(Millis(current.0.wrapping_add(millis)));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(Millis(millis));
    }
}

impl TimeSource<Millis> for MockTimeSource {
    fn now(&self) -> Millis {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Strip
// ============================================================================

/// Mock strip that records every frame pushed to it
#[derive(Default)]
pub struct RecordingStrip {
    frames: Vec<Vec<Rgb24>>,
}

impl RecordingStrip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Vec<Rgb24>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[Rgb24]> {
        self.frames.last().map(|f| f.as_slice())
    }
}

impl LedStrip for RecordingStrip {
    fn show(&mut self, frame: &[Rgb24]) {
        self.frames.push(frame.to_vec());
    }
}

// ============================================================================
// Mock Radio Queue
// ============================================================================

/// In-memory radio queue
///
/// Committed transmissions are collected in `sent`; packets pushed with
/// `deliver` are handed out oldest first.
pub struct MockRadio {
    slot: [u8; 18],
    pub tx_available: bool,
    pub sent: Vec<Vec<u8>>,
    inbox: VecDeque<Vec<u8>>,
    pub released: usize,
}

impl MockRadio {
    pub fn new() -> Self {
        Self {
            slot: [0; 18],
            tx_available: true,
            sent: Vec::new(),
            inbox: VecDeque::new(),
            released: 0,
        }
    }

    pub fn deliver(&mut self, packet: &[u8]) {
        self.inbox.push_back(packet.to_vec());
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl RadioQueue for MockRadio {
    fn tx_slot(&mut self) -> Option<&mut [u8]> {
        if self.tx_available {
            self.slot = [0; 18];
            Some(&mut self.slot[..])
        } else {
            None
        }
    }

    fn tx_commit(&mut self) {
        // Payload length lives in the first byte; keep only what it covers.
        let len = usize::from(self.slot[0]) + 1;
        self.sent.push(self.slot[..len].to_vec());
    }

    fn rx_packet(&mut self) -> Option<&[u8]> {
        self.inbox.front().map(|p| p.as_slice())
    }

    fn rx_release(&mut self) {
        self.inbox.pop_front();
        self.released += 1;
    }
}

// ============================================================================
// Mock Byte Source
// ============================================================================

/// Byte stream standing in for a UART or USB serial port
#[derive(Default)]
pub struct ByteSource {
    bytes: VecDeque<u8>,
    pub fail_reads: bool,
}

impl ByteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut source = Self::new();
        source.feed(bytes);
        source
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ErrorType for ByteSource {
    type Error = ErrorKind;
}

impl ReadReady for ByteSource {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bytes.is_empty())
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(ErrorKind::Other);
        }
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.bytes.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// A well-formed sync packet for the given channel bytes
pub fn sync_packet(hue: u8, saturation: u8, value: u8) -> [u8; 7] {
    [6, b'W', b'x', b'S', hue, saturation, value]
}

/// A `Wx|`-framed UART command
pub fn framed(command: &[u8; 7]) -> Vec<u8> {
    let mut bytes = b"Wx|".to_vec();
    bytes.extend_from_slice(command);
    bytes
}

/// Channel-wise absolute difference between two packed colors
pub fn max_channel_delta(a: Rgb24, b: Rgb24) -> u8 {
    a.red()
        .abs_diff(b.red())
        .max(a.green().abs_diff(b.green()))
        .max(a.blue().abs_diff(b.blue()))
}

// ============================================================================
// Mock Pins
// ============================================================================

/// Shared record of line levels, in the order they were driven
pub type PinTrace = std::rc::Rc<std::cell::RefCell<Vec<(char, bool)>>>;

/// Output pin that appends `(name, level)` to a shared trace
pub struct TracePin {
    name: char,
    trace: PinTrace,
}

impl TracePin {
    pub fn new(name: char, trace: &PinTrace) -> Self {
        Self {
            name,
            trace: trace.clone(),
        }
    }
}

impl embedded_hal::digital::ErrorType for TracePin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for TracePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.name, true));
        Ok(())
    }
}

/// Reassembles the packed colors shifted out on a data/clock trace
///
/// A data bit is sampled on every rising clock edge.
pub fn decode_trace(trace: &[(char, bool)]) -> Vec<u32> {
    let mut data = false;
    let mut clock = false;
    let mut bits = Vec::new();
    for &(name, level) in trace {
        match name {
            'd' => data = level,
            'c' => {
                if level && !clock {
                    bits.push(data);
                }
                clock = level;
            }
            _ => {}
        }
    }
    bits.chunks(24)
        .map(|led| led.iter().fold(0u32, |acc, &b| (acc << 1) | u32::from(b)))
        .collect()
}
