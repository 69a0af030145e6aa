use crate::foundation::core::{PixelRect, Resolution};
use crate::foundation::error::ThumbResult;
use crate::layout::fitter::{FittedText, LayoutWarning, SizeRange, TextBox, fit_text, fit_text_in};
use crate::layout::measure::TextMeasure;
use crate::style::registry::{HorizontalAnchor, Style, VerticalAnchor};

/// Pixel-exact placement of a caption on one canvas.
///
/// Plans are derived fresh for every `(caption, style, resolution)` triple and never shared
/// across resolutions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutPlan {
    /// Canvas the plan was computed for.
    pub canvas: Resolution,
    /// Style name.
    pub style: String,
    /// Box the caption was fitted into.
    pub text_box: TextBox,
    /// Chosen font size in pixels.
    pub font_size: u32,
    /// Line advance in pixels.
    pub line_height: u32,
    /// Lines in reading order.
    pub lines: Vec<String>,
    /// Measured width of each line.
    pub line_widths: Vec<f32>,
    /// Bounding rectangle of the text block; its top-left corner is the block origin.
    pub text_block: PixelRect,
    /// Background panel, absent when the style has none or the caption is empty.
    pub panel_rect: Option<PixelRect>,
    /// Horizontal alignment of lines inside the block.
    pub align: HorizontalAnchor,
    /// Secondary block drawn under the caption, absent when there is no subtext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<SubtextBlock>,
    /// Non-fatal conditions hit while fitting, caption first.
    pub warnings: Vec<LayoutWarning>,
}

/// Smaller text block placed below the caption, sharing its horizontal alignment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubtextBlock {
    /// Font size in pixels.
    pub font_size: u32,
    /// Line advance in pixels.
    pub line_height: u32,
    /// Lines in reading order.
    pub lines: Vec<String>,
    /// Measured width of each line.
    pub line_widths: Vec<f32>,
    /// Bounding rectangle of the block.
    pub block: PixelRect,
}

impl SubtextBlock {
    /// Top-left corner of line `idx`'s line box in canvas pixels.
    pub fn line_origin(&self, idx: usize, align: HorizontalAnchor) -> (f32, f32) {
        aligned_origin(self.block, &self.line_widths, self.line_height, idx, align)
    }
}

/// Vertical gap between the caption and the subtext, in subtext ems.
const SUBTEXT_GAP_EM: f64 = 0.5;
/// The subtext may use at most `1 / SUBTEXT_BOX_DIVISOR` of the text box height.
const SUBTEXT_BOX_DIVISOR: u32 = 3;

fn aligned_origin(
    block: PixelRect,
    widths: &[f32],
    line_height: u32,
    idx: usize,
    align: HorizontalAnchor,
) -> (f32, f32) {
    let width = widths.get(idx).copied().unwrap_or(0.0);
    let slack = (block.width as f32 - width).max(0.0);
    let dx = match align {
        HorizontalAnchor::Left => 0.0,
        HorizontalAnchor::Center => (slack * 0.5).floor(),
        HorizontalAnchor::Right => slack.floor(),
    };
    let dy = line_height as f32 * idx as f32;
    (block.x as f32 + dx, block.y as f32 + dy)
}

fn subtext_gap(font_size: u32) -> u32 {
    (f64::from(font_size) * SUBTEXT_GAP_EM).ceil() as u32
}

impl LayoutPlan {
    /// Top-left corner of the text block in canvas pixels.
    pub fn text_block_origin(&self) -> (u32, u32) {
        (self.text_block.x, self.text_block.y)
    }

    /// Return `true` when there is no text to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.subtext.is_none()
    }

    /// Top-left corner of line `idx`'s line box in canvas pixels.
    pub fn line_origin(&self, idx: usize) -> (f32, f32) {
        aligned_origin(
            self.text_block,
            &self.line_widths,
            self.line_height,
            idx,
            self.align,
        )
    }
}

/// Fit `caption` for `canvas` and place the block per the style's anchor.
pub fn plan_layout(
    caption: &str,
    canvas: Resolution,
    style: &Style,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<LayoutPlan> {
    plan_layout_with_subtext(caption, None, canvas, style, measure)
}

/// [`plan_layout`] with an optional secondary line set below the caption.
///
/// The subtext is fitted first, within its own size range and a third of the text box height;
/// the caption gets the rest of the box. A blank subtext is ignored.
pub fn plan_layout_with_subtext(
    caption: &str,
    subtext: Option<&str>,
    canvas: Resolution,
    style: &Style,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<LayoutPlan> {
    let canvas = Resolution::new(canvas.width, canvas.height)?;
    let text_box = TextBox::for_canvas(canvas, style);
    let (fitted, sub) = fit_blocks(caption, subtext, text_box, style, measure)
        .map_err(|e| e.at_resolution(canvas))?;
    Ok(place(fitted, sub, canvas, text_box, style))
}

fn fit_blocks(
    caption: &str,
    subtext: Option<&str>,
    text_box: TextBox,
    style: &Style,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<(FittedText, Option<FittedText>)> {
    let Some(subtext) = subtext.filter(|s| !s.trim().is_empty()) else {
        return Ok((fit_text(caption, text_box, style, measure)?, None));
    };

    let sub_box = TextBox {
        width: text_box.width,
        height: text_box.height / SUBTEXT_BOX_DIVISOR,
    };
    let sub = fit_text_in(subtext, sub_box, style, SizeRange::subtext(style), measure)?;
    let reserved = if caption.trim().is_empty() {
        0
    } else {
        sub.block_height() + subtext_gap(sub.font_size)
    };
    let main_box = TextBox {
        width: text_box.width,
        height: text_box.height.saturating_sub(reserved),
    };
    let main = fit_text(caption, main_box, style, measure)?;
    Ok((main, Some(sub)))
}

/// Place an already fitted caption and optional subtext as one anchored group.
pub fn place(
    fitted: FittedText,
    subtext: Option<FittedText>,
    canvas: Resolution,
    text_box: TextBox,
    style: &Style,
) -> LayoutPlan {
    let subtext = subtext.filter(|s| !s.lines.is_empty());
    let main_h = i64::from(fitted.block_height());
    let (sub_w, sub_h, gap) = match &subtext {
        Some(sub) => {
            let gap = if fitted.lines.is_empty() {
                0
            } else {
                subtext_gap(sub.font_size)
            };
            (sub.block_width(), i64::from(sub.block_height()), i64::from(gap))
        }
        None => (0, 0, 0),
    };
    let block_w = i64::from(fitted.block_width().max(sub_w).min(canvas.width));
    let block_h = (main_h + gap + sub_h).min(i64::from(canvas.height));
    let cw = i64::from(canvas.width);
    let ch = i64::from(canvas.height);
    let margin = f64::from(style.margin_fraction);
    let frac = |px: i64, f: f64| (px as f64 * f).round() as i64;

    let x = match style.anchor.horizontal {
        HorizontalAnchor::Left => frac(cw, margin),
        HorizontalAnchor::Center => (cw - block_w) / 2,
        HorizontalAnchor::Right => frac(cw, 1.0 - margin) - block_w,
    }
    .clamp(0, cw - block_w);
    let y = match style.anchor.vertical {
        VerticalAnchor::Top => frac(ch, margin),
        VerticalAnchor::Center => (ch - block_h) / 2,
        VerticalAnchor::Bottom => frac(ch, 1.0 - margin) - block_h,
    }
    .clamp(0, ch - block_h);
    let text_block = PixelRect::clipped(x, y, x + block_w, y + main_h, canvas);
    let mut warnings = fitted.warnings;
    let subtext = subtext.map(|sub| {
        warnings.extend(sub.warnings);
        let top = y + main_h + gap;
        SubtextBlock {
            font_size: sub.font_size,
            line_height: sub.line_height,
            lines: sub.lines,
            line_widths: sub.line_widths,
            block: PixelRect::clipped(x, top, x + block_w, top + sub_h, canvas),
        }
    });

    let pad_size = match &subtext {
        Some(sub) if fitted.lines.is_empty() => sub.font_size,
        _ => fitted.font_size,
    };
    let panel_rect = if style.has_panel() && !(fitted.lines.is_empty() && subtext.is_none()) {
        let pad = (f64::from(pad_size) * f64::from(style.panel_padding_em)).round() as i64;
        let (left, right) = if style.panel_full_width {
            (0, cw)
        } else {
            (x - pad, x + block_w + pad)
        };
        Some(PixelRect::clipped(left, y - pad, right, y + block_h + pad, canvas))
    } else {
        None
    };

    LayoutPlan {
        canvas,
        style: style.name.clone(),
        text_box,
        font_size: fitted.font_size,
        line_height: fitted.line_height,
        lines: fitted.lines,
        line_widths: fitted.line_widths,
        text_block,
        panel_rect,
        align: style.anchor.horizontal,
        subtext,
        warnings,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
