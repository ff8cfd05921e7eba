use std::path::Path;

use anyhow::Context as _;

use crate::assets::color::Color;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine, line_extents};
use crate::foundation::core::{Affine, Extent, Point, Rect};
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::surface::{FontWeight, FrameRGBA, Surface, TextAlign, TextBaseline, TextStyle};

/// Stroke width, in ems, used to embolden text when no bold face is loaded.
pub const SYNTHETIC_BOLD_STROKE_EM: f64 = 1.0 / 24.0;

/// Raw font bytes for the CPU surface.
///
/// `bold` is optional; without it bold text uses the regular face with stroked outlines.
#[derive(Clone, Debug)]
pub struct FontSet {
    /// Face used for regular text, and for bold text when `bold` is absent.
    pub regular: Vec<u8>,
    /// Face used for bold text.
    pub bold: Option<Vec<u8>>,
}

impl FontSet {
    /// Read font files from disk.
    pub fn from_paths(regular: &Path, bold: Option<&Path>) -> TextreelResult<Self> {
        let regular = std::fs::read(regular)
            .with_context(|| format!("read font '{}'", regular.display()))?;
        let bold = bold
            .map(|p| std::fs::read(p).with_context(|| format!("read font '{}'", p.display())))
            .transpose()?;
        Ok(Self { regular, bold })
    }
}

struct Face {
    layout: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl Face {
    fn new(bytes: &[u8]) -> TextreelResult<Self> {
        let layout = TextLayoutEngine::new(bytes)?;
        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.to_vec()), 0);
        Ok(Self { layout, font })
    }
}

/// CPU raster surface powered by `vello_cpu`, with Parley text shaping.
///
/// Draw calls accumulate in a render context and are rasterized into the backing pixmap on
/// [`Surface::present`]; [`Surface::read_frame`] returns the last presented pixmap as
/// premultiplied RGBA8.
pub struct CpuSurface {
    extent: Extent,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    transform: Affine,
    stack: Vec<Affine>,
    regular: Face,
    bold: Option<Face>,
}

impl CpuSurface {
    /// Allocate a pixmap of `extent` and register `fonts`.
    ///
    /// Fails when either dimension exceeds `u16::MAX` or a font cannot be parsed.
    pub fn new(extent: Extent, fonts: &FontSet) -> TextreelResult<Self> {
        let width: u16 = extent
            .width
            .try_into()
            .map_err(|_| TextreelError::validation("surface width exceeds u16"))?;
        let height: u16 = extent
            .height
            .try_into()
            .map_err(|_| TextreelError::validation("surface height exceeds u16"))?;

        let regular = Face::new(&fonts.regular)?;
        let bold = fonts.bold.as_deref().map(Face::new).transpose()?;
        tracing::debug!(
            width = extent.width,
            height = extent.height,
            family = regular.layout.family_name(),
            bold_face = bold.is_some(),
            "cpu surface created"
        );

        Ok(Self {
            extent,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            regular,
            bold,
        })
    }
}

impl Surface for CpuSurface {
    fn extent(&self) -> Option<Extent> {
        Some(self.extent)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> TextreelResult<()> {
        let [r, g, b, a] = color.to_rgba8();
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> TextreelResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        let wants_bold = style.weight == FontWeight::Bold;
        let (face, synthesize_bold) = match (wants_bold, self.bold.as_mut()) {
            (true, Some(bold)) => (bold, false),
            (true, None) => (&mut self.regular, true),
            (false, _) => (&mut self.regular, false),
        };

        let brush = TextBrushRgba8::from(style.color.to_rgba8());
        let layout = face
            .layout
            .layout_line(text, style.size_px, synthesize_bold, brush)?;
        let m = line_extents(&layout);

        let dx = match style.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -f64::from(m.width) / 2.0,
            TextAlign::Right => -f64::from(m.width),
        };
        let dy = match style.baseline {
            TextBaseline::Middle => -f64::from(m.height) / 2.0,
            TextBaseline::Alphabetic => -f64::from(m.baseline),
        };

        let placed = self.transform * Affine::translate((origin.x + dx, origin.y + dy));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(placed));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs: Vec<vello_cpu::Glyph> = run
                    .positioned_glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                let font_size = run.run().font_size();
                self.ctx
                    .glyph_run(&face.font)
                    .font_size(font_size)
                    .fill_glyphs(glyphs.iter().copied());

                // No bold face: thicken the regular outlines with a same-color stroke.
                if synthesize_bold {
                    self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(
                        f64::from(font_size) * SYNTHETIC_BOLD_STROKE_EM,
                    ));
                    self.ctx
                        .glyph_run(&face.font)
                        .font_size(font_size)
                        .stroke_glyphs(glyphs.into_iter());
                }
            }
        }
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
        let mut ctx = std::mem::replace(
            &mut self.ctx,
            vello_cpu::RenderContext::new(self.width, self.height),
        );
        clear_pixmap(&mut self.pixmap, [0, 0, 0, 0]);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }

    fn read_frame(&self) -> TextreelResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: self.extent.width,
            height: self.extent.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}
