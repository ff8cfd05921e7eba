use serde::{Deserialize, Serialize};

use crate::assets::color::Color;

/// Named transform behavior applied to the title text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Hop upward from the center.
    #[default]
    Bounce,
    /// Rotate around the center.
    Spin,
    /// Pulse the scale around the center.
    Wave,
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounce" => Ok(Self::Bounce),
            "spin" => Ok(Self::Spin),
            "wave" => Ok(Self::Wave),
            other => Err(format!(
                "unknown variant \"{other}\" (expected bounce, spin or wave)"
            )),
        }
    }
}

/// Immutable snapshot of what the animation draws.
///
/// Replacing the snapshot on an engine restarts the animation from elapsed `0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Title text, drawn bold at the center.
    pub text: String,
    /// Full-surface fill painted first on every frame.
    pub background_color: Color,
    /// Color of both the title and the elapsed-time overlay.
    pub text_color: Color,
    /// Motion applied to the title.
    pub variant: Variant,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            text: "Hello Video!".to_owned(),
            background_color: Color::rgba(
                f64::from(0x66u8) / 255.0,
                f64::from(0x7eu8) / 255.0,
                f64::from(0xeau8) / 255.0,
                1.0,
            ),
            text_color: Color::WHITE,
            variant: Variant::Bounce,
        }
    }
}

impl AnimationConfig {
    /// Replace the title text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Replace the motion variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Replace the background and text colors.
    pub fn with_colors(mut self, background: Color, text: Color) -> Self {
        self.background_color = background;
        self.text_color = text;
        self
    }
}
