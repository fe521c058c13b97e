//! Strip frame and output drivers.
//!
//! Provides [`RgbFrame`], the uniform per-position color buffer, the
//! [`LedStrip`] trait for hardware abstraction, and [`ClockedStrip`], which
//! shifts a frame out over a data line and a clock line.

use crate::colors::Rgb24;
use embedded_hal::digital::{ErrorKind, OutputPin, PinState};

/// Strip length used when none is given.
pub const DEFAULT_STRIP_LENGTH: usize = 5;

/// Bits shifted out per LED position.
const BITS_PER_LED: u32 = 24;

/// Trait for abstracting LED strip hardware.
///
/// Implement this for whatever pushes pixels to your strip. The frame is
/// ordered by position. Handle any hardware errors internally - this method
/// cannot fail.
pub trait LedStrip {
    /// Pushes one frame to the strip.
    fn show(&mut self, frame: &[Rgb24]);
}

/// One color per strip position.
///
/// The strip is driven as a single uniform color, so the only way to change a
/// frame is [`RgbFrame::fill`]; every position always holds the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbFrame<const N: usize> {
    pixels: [Rgb24; N],
}

impl<const N: usize> RgbFrame<N> {
    /// Creates a frame with every position set to `color`.
    pub const fn filled(color: Rgb24) -> Self {
        Self { pixels: [color; N] }
    }

    /// Sets every position to `color`.
    pub fn fill(&mut self, color: Rgb24) {
        self.pixels = [color; N];
    }

    /// The color shown on the strip, or black for a zero-length strip.
    pub fn color(&self) -> Rgb24 {
        self.pixels.first().copied().unwrap_or(Rgb24::BLACK)
    }

    /// Returns the colors in position order.
    pub fn as_slice(&self) -> &[Rgb24] {
        &self.pixels
    }

    /// Number of strip positions.
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns true for a zero-length strip.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for RgbFrame<N> {
    fn default() -> Self {
        Self::filled(Rgb24::BLACK)
    }
}

/// A line failed while a frame was being shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripError {
    /// The data line rejected a level change.
    Data(ErrorKind),
    /// The clock line rejected a level change.
    Clock(ErrorKind),
}

impl StripError {
    fn data<E: embedded_hal::digital::Error>(err: E) -> Self {
        StripError::Data(err.kind())
    }

    fn clock<E: embedded_hal::digital::Error>(err: E) -> Self {
        StripError::Clock(err.kind())
    }
}

impl core::fmt::Display for StripError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StripError::Data(kind) => write!(f, "strip data line error: {}", kind),
            StripError::Clock(kind) => write!(f, "strip clock line error: {}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StripError {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            StripError::Data(kind) => {
                defmt::write!(f, "strip data line error: {}", defmt::Debug2Format(kind))
            }
            StripError::Clock(kind) => {
                defmt::write!(f, "strip clock line error: {}", defmt::Debug2Format(kind))
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StripError {}

/// Two-wire clocked strip driver.
///
/// For every position the packed color is shifted out most significant bit
/// first: clock low, data to the bit level, clock high. The clock is left low
/// once the frame is done. There is no acknowledgement from the strip.
///
/// The whole frame is emitted inside a critical section so that interrupt
/// handlers cannot stretch a bit period and make the strip latch garbage.
pub struct ClockedStrip<D, C> {
    data: D,
    clock: C,
}

impl<D: OutputPin, C: OutputPin> ClockedStrip<D, C> {
    /// Creates a driver from the data and clock lines.
    pub fn new(data: D, clock: C) -> Self {
        Self { data, clock }
    }

    /// Shifts out a frame.
    ///
    /// On a line error the rest of the frame is abandoned, but the clock is
    /// still driven low before returning.
    pub fn write(&mut self, frame: &[Rgb24]) -> Result<(), StripError> {
        critical_section::with(|_| {
            let shifted = self.shift_out(frame);
            let parked = self.clock.set_low().map_err(StripError::clock);
            shifted.and(parked)
        })
    }

    /// Gives the lines back.
    pub fn release(self) -> (D, C) {
        (self.data, self.clock)
    }

    fn shift_out(&mut self, frame: &[Rgb24]) -> Result<(), StripError> {
        for color in frame {
            let bits = color.bits();
            for bit in (0..BITS_PER_LED).rev() {
                self.clock.set_low().map_err(StripError::clock)?;
                let level = PinState::from(bits & (1 << bit) != 0);
                self.data.set_state(level).map_err(StripError::data)?;
                self.clock.set_high().map_err(StripError::clock)?;
            }
        }
        Ok(())
    }
}

impl<D: OutputPin, C: OutputPin> LedStrip for ClockedStrip<D, C> {
    fn show(&mut self, frame: &[Rgb24]) {
        if let Err(err) = self.write(frame) {
            warn!("{}", err);
        }
    }
}
