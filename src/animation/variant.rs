use std::f64::consts::TAU;

use crate::animation::config::Variant;
use crate::foundation::core::{Affine, Point, Vec2};

/// Peak upward offset of the bounce.
pub const BOUNCE_AMPLITUDE_PX: f64 = 50.0;
/// Milliseconds per radian of the bounce sine.
pub const BOUNCE_DIVISOR_MS: f64 = 500.0;
/// Milliseconds per radian of rotation.
pub const SPIN_DIVISOR_MS: f64 = 1000.0;
/// Milliseconds per radian of the wave sine.
pub const WAVE_DIVISOR_MS: f64 = 300.0;
/// Maximum relative scale change of the wave.
pub const WAVE_DEPTH: f64 = 0.3;

/// Vertical offset in pixels; always within `[-50, 0]` (upward only).
///
/// The sine is rectified, so the visible up/down cycle repeats every ~1571 ms.
pub fn bounce_offset(elapsed_ms: f64) -> f64 {
    -(elapsed_ms.max(0.0) / BOUNCE_DIVISOR_MS).sin().abs() * BOUNCE_AMPLITUDE_PX
}

/// Rotation in radians, within `[0, 2pi)`.
pub fn spin_angle(elapsed_ms: f64) -> f64 {
    let angle = (elapsed_ms.max(0.0) / SPIN_DIVISOR_MS) % TAU;
    if angle >= TAU { 0.0 } else { angle }
}

/// Uniform scale factor, within `[0.7, 1.3]`.
pub fn wave_scale(elapsed_ms: f64) -> f64 {
    1.0 + WAVE_DEPTH * (elapsed_ms.max(0.0) / WAVE_DIVISOR_MS).sin()
}

/// Transform of the title text for one tick, before anchoring at the surface center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Vertical shift.
    Translate {
        /// Offset in pixels, negative is up.
        dy: f64,
    },
    /// Rotation about the center.
    Rotate {
        /// Angle in radians.
        radians: f64,
    },
    /// Uniform scale about the center.
    Scale {
        /// Scale factor.
        factor: f64,
    },
}

impl Motion {
    /// Anchor the motion at `center`: translate to the center, then apply the motion.
    pub fn to_affine(self, center: Point) -> Affine {
        let anchor = Affine::translate(center.to_vec2());
        match self {
            Self::Translate { dy } => anchor * Affine::translate(Vec2::new(0.0, dy)),
            Self::Rotate { radians } => anchor * Affine::rotate(radians),
            Self::Scale { factor } => anchor * Affine::scale(factor),
        }
    }
}

impl Variant {
    /// Motion of this variant `elapsed_ms` into the loop.
    pub fn motion_at(self, elapsed_ms: f64) -> Motion {
        match self {
            Self::Bounce => Motion::Translate {
                dy: bounce_offset(elapsed_ms),
            },
            Self::Spin => Motion::Rotate {
                radians: spin_angle(elapsed_ms),
            },
            Self::Wave => Motion::Scale {
                factor: wave_scale(elapsed_ms),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/variant.rs"]
mod tests;
