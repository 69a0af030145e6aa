use image::RgbImage;
use vello_cpu::kurbo::Rect;
use vello_cpu::peniko::{Blob, Color, FontData};

use crate::assets::font::LoadedFont;
use crate::assets::frame::Frame;
use crate::foundation::core::{PixelRect, Resolution, Rgb8};
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::layout::measure::TextLayoutEngine;
use crate::layout::plan::LayoutPlan;
use crate::render::composite::over_rgb_in_place;
use crate::render::resample::cover_crop;
use crate::style::registry::Style;

const SHADOW_ALPHA: u8 = 160;
const SHADOW_OFFSET_EM: f32 = 0.04;
const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;
const OUTLINE_DIRECTIONS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (DIAG, DIAG),
    (0.0, 1.0),
    (-DIAG, DIAG),
    (-1.0, 0.0),
    (-DIAG, -DIAG),
    (0.0, -1.0),
    (DIAG, -DIAG),
];

/// Shapes caption lines with one font and hands the glyphs to the rasterizer.
///
/// Each render worker owns its own painter; shaping contexts are not shared between threads.
pub struct TextPainter {
    engine: TextLayoutEngine,
    font: FontData,
}

struct ShapedLine {
    glyphs: Vec<vello_cpu::Glyph>,
}

impl TextPainter {
    /// Painter for `font`.
    pub fn new(font: &LoadedFont) -> ThumbResult<Self> {
        Ok(Self {
            engine: TextLayoutEngine::new(font)?,
            font: FontData::new(Blob::from(font.bytes.as_ref().clone()), font.index),
        })
    }

    /// Shape `text` so that its line box has top-left `(left, top)` and height `line_height`.
    fn shape_line(
        &mut self,
        text: &str,
        size_px: f32,
        (left, top): (f32, f32),
        line_height: f32,
    ) -> ThumbResult<ShapedLine> {
        let layout = self.engine.layout_line(text, size_px)?;
        let mut glyphs = Vec::new();
        for line in layout.lines() {
            let m = line.metrics();
            // Center the font's ascent+descent inside the styled line box.
            let dy = top + (line_height - (m.ascent + m.descent)) * 0.5 + m.ascent - m.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: left + g.x,
                    y: dy + g.y,
                }));
            }
        }
        Ok(ShapedLine { glyphs })
    }

    fn fill(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        size_px: f32,
        line: &ShapedLine,
        (dx, dy): (f32, f32),
    ) {
        let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x + dx,
            y: g.y + dy,
        });
        ctx.glyph_run(&self.font)
            .font_size(size_px)
            .fill_glyphs(glyphs);
    }
}

/// Render one thumbnail: cover-cropped base frame, optional panel, then the caption.
///
/// `painter` may be `None` only when the plan has no lines.
#[tracing::instrument(level = "debug", skip_all, fields(style = %style.name, canvas = %plan.canvas))]
pub fn render_thumbnail(
    frame: &Frame,
    plan: &LayoutPlan,
    style: &Style,
    painter: Option<&mut TextPainter>,
) -> ThumbResult<RgbImage> {
    let (w16, h16) = raster_size(plan.canvas)?;
    let mut base = cover_crop(frame, plan.canvas)?;
    if plan.panel_rect.is_none() && plan.is_empty() {
        return Ok(base);
    }

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    if let Some(panel) = plan.panel_rect {
        draw_panel(&mut ctx, panel, style);
    }
    if !plan.is_empty() {
        let painter = painter.ok_or_else(|| {
            ThumbError::font_load(
                &style.font_family,
                style.font_weight,
                "caption has text but no font was loaded",
            )
        })?;
        draw_caption(&mut ctx, painter, plan, style)?;
    }
    ctx.flush();

    let mut overlay = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut overlay);
    over_rgb_in_place(&mut base, overlay.data_as_u8_slice())?;
    Ok(base)
}

fn raster_size(canvas: Resolution) -> ThumbResult<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ThumbError::unsupported_resolution(
            canvas.width,
            canvas.height,
            "width and height must be non-zero",
        ));
    }
    let w: u16 = canvas.width.try_into().map_err(|_| {
        ThumbError::unsupported_resolution(canvas.width, canvas.height, "width exceeds u16")
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        ThumbError::unsupported_resolution(canvas.width, canvas.height, "height exceeds u16")
    })?;
    Ok((w, h))
}

fn draw_panel(ctx: &mut vello_cpu::RenderContext, panel: PixelRect, style: &Style) {
    let alpha = (style.panel_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    ctx.set_paint(color(style.panel_color, alpha));
    ctx.fill_rect(&Rect::new(
        f64::from(panel.x),
        f64::from(panel.y),
        f64::from(panel.right()),
        f64::from(panel.bottom()),
    ));
}

struct TextPass {
    size: f32,
    shadow_offset: Option<f32>,
    outline_radius: Option<f32>,
}

fn draw_caption(
    ctx: &mut vello_cpu::RenderContext,
    painter: &mut TextPainter,
    plan: &LayoutPlan,
    style: &Style,
) -> ThumbResult<()> {
    let size = plan.font_size as f32;
    let line_height = plan.line_height as f32;
    let mut lines = Vec::with_capacity(plan.lines.len());
    for (idx, text) in plan.lines.iter().enumerate() {
        lines.push(painter.shape_line(text, size, plan.line_origin(idx), line_height)?);
    }
    let pass = TextPass {
        size,
        shadow_offset: style.shadow.then(|| (size * SHADOW_OFFSET_EM).round().max(1.0)),
        outline_radius: (style.outline_width_em > 0.0)
            .then(|| (size * style.outline_width_em).round().max(1.0)),
    };
    draw_lines(ctx, painter, &lines, &pass, style);

    if let Some(sub) = &plan.subtext {
        let size = sub.font_size as f32;
        let mut lines = Vec::with_capacity(sub.lines.len());
        for (idx, text) in sub.lines.iter().enumerate() {
            let origin = sub.line_origin(idx, plan.align);
            lines.push(painter.shape_line(text, size, origin, sub.line_height as f32)?);
        }
        // One pixel thinner than the caption outline would be at this size.
        let pass = TextPass {
            size,
            shadow_offset: style.shadow.then(|| (size * SHADOW_OFFSET_EM).round().max(1.0)),
            outline_radius: (style.outline_width_em > 0.0)
                .then(|| ((size * style.outline_width_em).round() - 1.0).max(1.0)),
        };
        draw_lines(ctx, painter, &lines, &pass, style);
    }
    Ok(())
}

fn draw_lines(
    ctx: &mut vello_cpu::RenderContext,
    painter: &TextPainter,
    lines: &[ShapedLine],
    pass: &TextPass,
    style: &Style,
) {
    if let Some(d) = pass.shadow_offset {
        ctx.set_paint(color(Rgb8::BLACK, SHADOW_ALPHA));
        for line in lines {
            painter.fill(ctx, pass.size, line, (d, d));
        }
    }

    if let Some(r) = pass.outline_radius {
        ctx.set_paint(color(style.outline_color, 255));
        for (ux, uy) in OUTLINE_DIRECTIONS {
            for line in lines {
                painter.fill(ctx, pass.size, line, (ux * r, uy * r));
            }
        }
    }

    ctx.set_paint(color(style.primary_color, 255));
    for line in lines {
        painter.fill(ctx, pass.size, line, (0.0, 0.0));
    }
}

fn color(rgb: Rgb8, alpha: u8) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, alpha)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
