//! Color model and integer HSV to RGB conversion.
//!
//! Colors are kept in the integer HSV space the strip firmware has always used:
//! hue in `0..=239` (six sextants of 40 units), saturation and value in
//! `0..=255`. Channels are stored as `i16` so out-of-range values can be carried
//! through unchanged and rejected by [`hsv_to_rgb`] at render time.

use palette::Srgb;

/// Largest valid hue.
pub const HUE_MAX: i16 = 239;

/// Width of one hue sextant.
const SEXTANT: i32 = 40;

/// An integer HSV color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    /// Hue, valid range `0..=239`.
    pub hue: i16,
    /// Saturation, valid range `0..=255`.
    pub saturation: i16,
    /// Value, valid range `0..=255`.
    pub value: i16,
}

impl Hsv {
    /// Creates a color from raw channels. No range checks are applied.
    #[inline]
    pub const fn new(hue: i16, saturation: i16, value: i16) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Creates a color from three raw bytes, as carried by commands and radio packets.
    #[inline]
    pub const fn from_bytes(hue: u8, saturation: u8, value: u8) -> Self {
        Self::new(hue as i16, saturation as i16, value as i16)
    }

    /// Returns the color with hue capped at [`HUE_MAX`].
    ///
    /// Saturation and value are left as they are.
    #[inline]
    pub fn with_capped_hue(self) -> Self {
        Self {
            hue: self.hue.min(HUE_MAX),
            ..self
        }
    }

    /// Returns the channels as bytes for the wire, clamping each to `0..=255`.
    pub fn to_bytes(self) -> [u8; 3] {
        [self.hue, self.saturation, self.value].map(|c| c.clamp(0, 255) as u8)
    }

    /// Converts to a packed strip color. See [`hsv_to_rgb`].
    #[inline]
    pub fn to_rgb(self) -> Rgb24 {
        hsv_to_rgb(self.hue, self.saturation, self.value)
    }
}

/// A packed 24-bit strip color: red in bits 0-7, green in 8-15, blue in 16-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb24(u32);

impl Rgb24 {
    /// All channels off.
    pub const BLACK: Rgb24 = Rgb24::new(0, 0, 0);

    /// All channels at full level.
    pub const WHITE: Rgb24 = Rgb24::new(255, 255, 255);

    /// Packs three channel levels.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Rgb24(((blue as u32) << 16) | ((green as u32) << 8) | red as u32)
    }

    /// Wraps a packed value, discarding anything above bit 23.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Rgb24(bits & 0x00FF_FFFF)
    }

    /// The packed value, as shifted out to the strip.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// The red channel level.
    #[inline]
    pub const fn red(self) -> u8 {
        self.0 as u8
    }

    /// The green channel level.
    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The blue channel level.
    #[inline]
    pub const fn blue(self) -> u8 {
        (self.0 >> 16) as u8
    }
}

impl From<Srgb<u8>> for Rgb24 {
    fn from(color: Srgb<u8>) -> Self {
        Rgb24::new(color.red, color.green, color.blue)
    }
}

impl From<Rgb24> for Srgb<u8> {
    fn from(color: Rgb24) -> Self {
        Srgb::new(color.red(), color.green(), color.blue())
    }
}

/// Converts an integer HSV triple to a packed strip color.
///
/// Out-of-range input is not an error:
/// - saturation or value outside `0..=255` gives [`Rgb24::BLACK`]
/// - otherwise, hue outside `0..=239` gives [`Rgb24::WHITE`]
///
/// All divisions truncate.
pub fn hsv_to_rgb(hue: i16, saturation: i16, value: i16) -> Rgb24 {
    let (h, s, v) = (i32::from(hue), i32::from(saturation), i32::from(value));

    if !(0..=255).contains(&s) || !(0..=255).contains(&v) {
        return Rgb24::BLACK;
    }
    if !(0..=i32::from(HUE_MAX)).contains(&h) {
        return Rgb24::WHITE;
    }

    let sextant = h / SEXTANT;
    let mut f = h % SEXTANT;
    // Even sextants ramp the secondary channel up, odd ones ramp it down.
    if sextant % 2 == 0 {
        f = SEXTANT - f;
    }

    let m = v * (255 - s) / 256;
    let n = v * (255 - s * f / SEXTANT) / 256;

    let (r, g, b) = match sextant {
        1 => (n, v, m),
        2 => (m, v, n),
        3 => (m, n, v),
        4 => (n, m, v),
        5 => (v, m, n),
        _ => (v, n, m),
    };

    // Every term is within 0..=255 here.
    Rgb24::new(r as u8, g as u8, b as u8)
}
