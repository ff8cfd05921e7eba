use crate::assets::color::Color;
use crate::foundation::core::{Affine, Extent, Fps, Point, Rect};
use crate::foundation::error::TextreelResult;
use crate::render::stream::FrameStream;

/// A captured surface frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Horizontal placement of text relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Line starts at the origin.
    Left,
    /// Line is centered on the origin.
    Center,
    /// Line ends at the origin.
    Right,
}

/// Vertical placement of text relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    /// The origin sits halfway between the line's top and bottom.
    Middle,
    /// The origin sits on the first line's alphabetic baseline.
    Alphabetic,
}

/// Requested font weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    /// Normal weight.
    Regular,
    /// Bold weight, synthesized when no bold face is available.
    Bold,
}

/// Glyph style for [`Surface::draw_text`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// Font weight.
    pub weight: FontWeight,
    /// Horizontal anchor.
    pub align: TextAlign,
    /// Vertical anchor.
    pub baseline: TextBaseline,
    /// Fill color.
    pub color: Color,
}

/// Raster target the animation draws onto and capture samples from.
///
/// Draw calls are affected by the current transform. `push_transform` composes a transform onto
/// the current one and saves the previous state; `pop_transform` restores it. Nothing drawn is
/// observable through [`Surface::read_frame`] until [`Surface::present`] commits the frame.
pub trait Surface {
    /// Surface dimensions, or `None` while the surface is not attached/sized.
    fn extent(&self) -> Option<Extent>;

    /// Fill `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color) -> TextreelResult<()>;

    /// Draw `text` anchored at `origin` according to `style.align` and `style.baseline`.
    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> TextreelResult<()>;

    /// Compose `transform` onto the current transform, saving the previous one.
    fn push_transform(&mut self, transform: Affine);

    /// Restore the transform saved by the matching `push_transform`.
    fn pop_transform(&mut self);

    /// Commit pending draw calls as the current frame.
    fn present(&mut self) -> TextreelResult<()>;

    /// Read back the last presented frame.
    fn read_frame(&self) -> TextreelResult<FrameRGBA>;

    /// Tap this surface as a live frame stream sampled at `fps`.
    fn as_frame_stream(&self, fps: Fps) -> FrameStream {
        FrameStream::new(fps)
    }
}
