use crate::assets::color::Color;
use crate::foundation::core::{Affine, Extent, Point, Rect};
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::surface::{FrameRGBA, Surface, TextStyle};

/// One draw call observed by a [`RecordingSurface`], with the transform active at the time.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// [`Surface::fill_rect`].
    FillRect {
        /// Rectangle in local coordinates.
        rect: Rect,
        /// Fill color.
        color: Color,
        /// Transform active at the call.
        transform: Affine,
    },
    /// [`Surface::draw_text`].
    Text {
        /// Drawn string.
        text: String,
        /// Anchor in local coordinates.
        origin: Point,
        /// Style passed with the call.
        style: TextStyle,
        /// Transform active at the call.
        transform: Affine,
    },
    /// [`Surface::present`].
    Present,
}

/// Surface that records draw calls instead of rasterizing them. For tests and debugging.
///
/// Presented frames are solid fills of the most recent full-surface rectangle color, which is
/// enough for capture plumbing to observe distinct frames.
#[derive(Debug)]
pub struct RecordingSurface {
    extent: Option<Extent>,
    transform: Affine,
    stack: Vec<Affine>,
    calls: Vec<DrawCall>,
    pending_fill: Option<Color>,
    presented: Option<FrameRGBA>,
}

impl RecordingSurface {
    /// An attached surface of `extent`.
    pub fn new(extent: Extent) -> Self {
        Self {
            extent: Some(extent),
            ..Self::detached()
        }
    }

    /// A surface that is not attached yet.
    pub fn detached() -> Self {
        Self {
            extent: None,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            calls: Vec::new(),
            pending_fill: None,
            presented: None,
        }
    }

    /// Give the surface dimensions.
    pub fn attach(&mut self, extent: Extent) {
        self.extent = Some(extent);
    }

    /// Calls recorded since creation or the last `take_calls`.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Depth of the saved-transform stack.
    pub fn transform_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of `Present` calls among the recorded ones.
    pub fn presented_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Present))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn extent(&self) -> Option<Extent> {
        self.extent
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> TextreelResult<()> {
        if let Some(extent) = self.extent
            && rect == extent.rect()
        {
            self.pending_fill = Some(color);
        }
        self.calls.push(DrawCall::FillRect {
            rect,
            color,
            transform: self.transform,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> TextreelResult<()> {
        self.calls.push(DrawCall::Text {
            text: text.to_owned(),
            origin,
            style: *style,
            transform: self.transform,
        });
        Ok(())
    }

    fn push_transform(&mut self, transform: Affine) {
        self.stack.push(self.transform);
        self.transform = self.transform * transform;
    }

    fn pop_transform(&mut self) {
        self.transform = self.stack.pop().unwrap_or(Affine::IDENTITY);
    }

    fn present(&mut self) -> TextreelResult<()> {
        let extent = self
            .extent
            .ok_or_else(|| TextreelError::render("cannot present a detached surface"))?;
        let px = self.pending_fill.unwrap_or(Color::BLACK).to_rgba8();
        let mut data = Vec::with_capacity(extent.rgba8_len());
        for _ in 0..(extent.width as usize * extent.height as usize) {
            data.extend_from_slice(&px);
        }
        self.presented = Some(FrameRGBA {
            width: extent.width,
            height: extent.height,
            data,
            premultiplied: false,
        });
        self.calls.push(DrawCall::Present);
        Ok(())
    }

    fn read_frame(&self) -> TextreelResult<FrameRGBA> {
        if let Some(frame) = self.presented.as_ref() {
            return Ok(frame.clone());
        }
        let extent = self
            .extent
            .ok_or_else(|| TextreelError::render("cannot read a detached surface"))?;
        Ok(FrameRGBA {
            width: extent.width,
            height: extent.height,
            data: vec![0; extent.rgba8_len()],
            premultiplied: false,
        })
    }
}
