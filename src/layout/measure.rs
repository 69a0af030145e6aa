use std::collections::HashMap;

use crate::assets::font::LoadedFont;
use crate::foundation::error::{ThumbError, ThumbResult};

/// Measures the advance width of single-line text at integer pixel sizes.
///
/// The fitter only ever asks for widths; line height comes from the style, so any two
/// measurers that agree on widths produce identical plans.
pub trait TextMeasure {
    /// Width in pixels of `text` set on one line at `size_px`.
    fn line_width(&mut self, text: &str, size_px: u32) -> ThumbResult<f32>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn line_width(&mut self, text: &str, size_px: u32) -> ThumbResult<f32> {
        (**self).line_width(text, size_px)
    }
}

/// Font-free measurer where every character advances by the same fraction of the font size.
///
/// Useful for layout previews and for tests that must not depend on installed fonts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasure {
    /// Advance per character in ems.
    pub advance_em: f32,
}

impl FixedAdvanceMeasure {
    /// Measurer with `advance_em` ems per character.
    pub fn new(advance_em: f32) -> Self {
        Self { advance_em }
    }
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn line_width(&mut self, text: &str, size_px: u32) -> ThumbResult<f32> {
        Ok(text.chars().count() as f32 * self.advance_em * size_px as f32)
    }
}

/// Stateful helper for building Parley layouts of single caption lines with one font.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    face: parley::fontique::FontInfo,
}

impl TextLayoutEngine {
    /// Register `font` in a private collection (no system fonts) and prepare layout contexts.
    ///
    /// Collections register every face they contain; layouts always select the face at
    /// `font.index`, the one the painter draws with.
    pub fn new(font: &LoadedFont) -> ThumbResult<Self> {
        let mut font_ctx = parley::FontContext {
            collection: parley::fontique::Collection::new(parley::fontique::CollectionOptions {
                system_fonts: false,
                ..Default::default()
            }),
            source_cache: parley::fontique::SourceCache::default(),
        };

        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let (family_id, face) = families
            .iter()
            .find_map(|(id, faces)| {
                faces
                    .iter()
                    .find(|info| info.index() == font.index)
                    .map(|info| (*id, info.clone()))
            })
            .ok_or_else(|| {
                ThumbError::font_load(
                    &font.family,
                    font.weight,
                    format!("font bytes have no face at index {}", font.index),
                )
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| {
                ThumbError::font_load(&font.family, font.weight, "registered font has no name")
            })?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            face,
        })
    }

    /// Weight of the face layouts are shaped with.
    pub fn face_weight(&self) -> f32 {
        self.face.weight().value()
    }

    /// Family name parley resolved from the font bytes.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` as a single unbroken line at `size_px`.
    pub fn layout_line(&mut self, text: &str, size_px: f32) -> ThumbResult<parley::Layout<()>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ThumbError::config("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(self.face.weight()));
        builder.push_default(parley::style::StyleProperty::FontStyle(self.face.style()));
        builder.push_default(parley::style::StyleProperty::FontWidth(self.face.width()));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Measurer backed by real glyph advances of a loaded font.
pub struct FontMeasure {
    engine: TextLayoutEngine,
    cache: HashMap<(u32, String), f32>,
}

impl FontMeasure {
    /// Measurer for `font`.
    pub fn new(font: &LoadedFont) -> ThumbResult<Self> {
        Ok(Self {
            engine: TextLayoutEngine::new(font)?,
            cache: HashMap::new(),
        })
    }
}

impl TextMeasure for FontMeasure {
    fn line_width(&mut self, text: &str, size_px: u32) -> ThumbResult<f32> {
        let key = (size_px, text.to_string());
        if let Some(w) = self.cache.get(&key) {
            return Ok(*w);
        }
        let layout = self.engine.layout_line(text, size_px as f32)?;
        let mut w = 0.0f32;
        for line in layout.lines() {
            w = w.max(line.metrics().advance);
        }
        self.cache.insert(key, w);
        Ok(w)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/measure.rs"]
mod tests;
