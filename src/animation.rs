//! Color animation engine.
//!
//! Provides [`ColorAnimator`], which owns the strip, the current and target
//! colors, and the rendered frame. Each [`tick`](ColorAnimator::tick) moves
//! every channel of the current color one unit toward the target and pushes
//! the new frame to the strip.

use crate::colors::Hsv;
use crate::strip::{LedStrip, RgbFrame};
use crate::time::TimeInstant;
use core::cmp::Ordering;

/// Minimum time between two animation steps.
pub const STEP_INTERVAL_MS: u64 = 4;

/// Color shown right after power-up.
pub const BOOT_COLOR: Hsv = Hsv::new(0, 0, 0);

/// Color the strip fades to after power-up.
pub const BOOT_TARGET: Hsv = Hsv::new(0, 0, 255);

/// Animates a uniform strip toward a target color.
///
/// Channels move independently, one unit per step, so a channel with a small
/// delta settles before one with a large delta. Steps are rate limited: a tick
/// that comes too soon after the previous step does nothing, and missed steps
/// are not made up later.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `S` - Strip implementation type
/// * `N` - Number of strip positions
pub struct ColorAnimator<I: TimeInstant, S: LedStrip, const N: usize> {
    strip: S,
    current: Hsv,
    target: Hsv,
    frame: RgbFrame<N>,
    last_step: Option<I>,
    step_interval_ms: u64,
}

impl<I: TimeInstant, S: LedStrip, const N: usize> ColorAnimator<I, S, N> {
    /// Creates an animator in the power-up state: black, fading to white.
    ///
    /// Nothing is written to the strip until [`render`](Self::render) or the
    /// first effective [`tick`](Self::tick).
    pub fn new(strip: S) -> Self {
        Self::with_colors(strip, BOOT_COLOR, BOOT_TARGET)
    }

    /// Creates an animator with explicit current and target colors.
    pub fn with_colors(strip: S, current: Hsv, target: Hsv) -> Self {
        Self {
            strip,
            current,
            target: target.with_capped_hue(),
            frame: RgbFrame::filled(current.to_rgb()),
            last_step: None,
            step_interval_ms: STEP_INTERVAL_MS,
        }
    }

    /// Overrides the minimum time between steps.
    pub fn set_step_interval(&mut self, millis: u64) {
        self.step_interval_ms = millis;
    }

    /// Recomputes the frame from the current color and pushes it.
    pub fn render(&mut self) {
        self.frame.fill(self.current.to_rgb());
        self.strip.show(self.frame.as_slice());
    }

    /// Sets the color to animate toward.
    ///
    /// Hue is capped at 239. Saturation and value are stored as given; out of
    /// range values render black once the current color reaches them.
    /// Returns the color actually stored.
    pub fn set_target(&mut self, color: Hsv) -> Hsv {
        self.target = color.with_capped_hue();
        self.target
    }

    /// Advances the animation by one step if enough time has passed.
    ///
    /// Returns `true` if a new frame was pushed to the strip. Once the current
    /// color equals the target, ticks do no work at all.
    pub fn tick(&mut self, now: I) -> bool {
        if let Some(last) = self.last_step {
            if now.millis_since(last) < self.step_interval_ms {
                return false;
            }
        }
        self.last_step = Some(now);

        if self.current == self.target {
            return false;
        }

        self.current = Hsv {
            hue: approach(self.current.hue, self.target.hue),
            saturation: approach(self.current.saturation, self.target.saturation),
            value: approach(self.current.value, self.target.value),
        };
        trace!("animation step");
        self.render();
        true
    }

    /// Returns the color currently on the strip.
    pub fn current(&self) -> Hsv {
        self.current
    }

    /// Returns the color being animated toward.
    pub fn target(&self) -> Hsv {
        self.target
    }

    /// Returns true once the current color has reached the target.
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Returns the last rendered frame.
    pub fn frame(&self) -> &RgbFrame<N> {
        &self.frame
    }

    /// Returns the strip driver.
    pub fn strip(&self) -> &S {
        &self.strip
    }

    /// Returns the strip driver mutably.
    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }
}

/// Moves `current` one unit toward `target`, never past it.
fn approach(current: i16, target: i16) -> i16 {
    match current.cmp(&target) {
        Ordering::Less => current + 1,
        Ordering::Greater => current - 1,
        Ordering::Equal => current,
    }
}
