use std::time::Duration;

use crate::foundation::error::{TextreelError, TextreelResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Rate (frames, ticks or samples per second) represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated rate.
    pub fn new(num: u32, den: u32) -> TextreelResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Whole-number rate, e.g. `Fps::whole(30)` for 30 Hz.
    pub fn whole(hz: u32) -> TextreelResult<Self> {
        Self::new(hz, 1)
    }

    /// Reject a zero numerator, a zero denominator, or a rate whose interval rounds to 0ns.
    pub fn validate(self) -> TextreelResult<()> {
        if self.den == 0 {
            return Err(TextreelError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(TextreelError::validation("Fps num must be > 0"));
        }
        if self.interval_nanos() == 0 {
            return Err(TextreelError::validation(
                "Fps rate must be at most 1e9 per second (interval would be 0ns)",
            ));
        }
        Ok(())
    }

    /// Convert to floating-point rate.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one interval, truncated to whole nanoseconds.
    ///
    /// Zero for rates that [`Fps::validate`] rejects.
    pub fn interval(self) -> Duration {
        Duration::from_nanos(self.interval_nanos())
    }

    fn interval_nanos(self) -> u64 {
        (u64::from(self.den) * 1_000_000_000)
            .checked_div(u64::from(self.num))
            .unwrap_or(0)
    }
}

/// Pixel dimensions of an attached surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Non-zero dimensions.
    pub fn new(width: u32, height: u32) -> TextreelResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextreelError::validation(
                "surface width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// The full surface as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Midpoint of the surface.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Byte length of a tightly packed RGBA8 frame of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
