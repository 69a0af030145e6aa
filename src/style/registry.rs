use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{ThumbError, ThumbResult};

/// Vertical placement of the text block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    /// Top edge of the block sits `margin_fraction` below the top of the canvas.
    Top,
    /// Block is centered vertically.
    Center,
    /// Bottom edge of the block sits `margin_fraction` above the bottom of the canvas.
    Bottom,
}

/// Horizontal placement of the text block and alignment of its lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    /// Flush left, inset by the margin.
    Left,
    /// Centered; every line is centered within the block.
    Center,
    /// Flush right, inset by the margin.
    Right,
}

/// Anchor position of the caption block on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    /// Vertical placement.
    pub vertical: VerticalAnchor,
    /// Horizontal placement.
    #[serde(default = "default_horizontal")]
    pub horizontal: HorizontalAnchor,
}

fn default_horizontal() -> HorizontalAnchor {
    HorizontalAnchor::Center
}

impl Anchor {
    /// Horizontally centered anchor at `vertical`.
    pub const fn centered(vertical: VerticalAnchor) -> Self {
        Self {
            vertical,
            horizontal: HorizontalAnchor::Center,
        }
    }
}

/// Immutable bundle of visual layout parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    /// Registry key.
    pub name: String,
    /// Font family name, resolved without substitution.
    pub font_family: String,
    /// CSS-style numeric weight (400 regular, 700 bold).
    pub font_weight: u16,
    /// Text fill color.
    pub primary_color: Rgb8,
    /// Outline (stroke) color.
    pub outline_color: Rgb8,
    /// Outline width as a fraction of the font size; `0` disables the outline pass.
    pub outline_width_em: f32,
    /// Draw a translucent drop shadow under the text.
    pub shadow: bool,
    /// Background panel color.
    pub panel_color: Rgb8,
    /// Panel opacity in `[0, 1]`; `0` means the style has no panel.
    pub panel_opacity: f32,
    /// Stretch the panel across the full canvas width instead of boxing the text block.
    pub panel_full_width: bool,
    /// Panel padding around the text block as a fraction of the font size.
    pub panel_padding_em: f32,
    /// Block placement.
    pub anchor: Anchor,
    /// Distance from the anchored canvas edge as a fraction of the canvas dimension.
    pub margin_fraction: f32,
    /// Fraction of canvas width the text may occupy.
    pub max_width_fraction: f32,
    /// Fraction of canvas height the text may occupy.
    pub max_height_fraction: f32,
    /// Smallest legible font size in pixels.
    pub min_font_size: u32,
    /// Largest font size in pixels.
    pub max_font_size: u32,
    /// Smallest subtext size in pixels.
    pub subtext_min_font_size: u32,
    /// Largest subtext size in pixels; never above `max_font_size`.
    pub subtext_max_font_size: u32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Style {
    /// Check the style invariants.
    pub fn validate(&self) -> ThumbResult<()> {
        let fail = |reason: String| Err(ThumbError::invalid_style(&self.name, reason));
        if self.name.trim().is_empty() {
            return fail("name must be non-empty".to_string());
        }
        if self.font_family.trim().is_empty() {
            return fail("font_family must be non-empty".to_string());
        }
        if !(1..=1000).contains(&self.font_weight) {
            return fail(format!("font_weight {} not in 1..=1000", self.font_weight));
        }
        if self.min_font_size == 0 {
            return fail("min_font_size must be > 0".to_string());
        }
        if self.min_font_size > self.max_font_size {
            return fail(format!(
                "min_font_size {} exceeds max_font_size {}",
                self.min_font_size, self.max_font_size
            ));
        }
        for (field, v) in [
            ("max_width_fraction", self.max_width_fraction),
            ("max_height_fraction", self.max_height_fraction),
        ] {
            if !(v.is_finite() && v > 0.0 && v <= 1.0) {
                return fail(format!("{field} {v} not in (0, 1]"));
            }
        }
        if !(self.panel_opacity.is_finite() && (0.0..=1.0).contains(&self.panel_opacity)) {
            return fail(format!("panel_opacity {} not in [0, 1]", self.panel_opacity));
        }
        if !(self.margin_fraction.is_finite() && (0.0..0.5).contains(&self.margin_fraction)) {
            return fail(format!("margin_fraction {} not in [0, 0.5)", self.margin_fraction));
        }
        if self.subtext_min_font_size == 0 {
            return fail("subtext_min_font_size must be > 0".to_string());
        }
        if self.subtext_min_font_size > self.subtext_max_font_size {
            return fail(format!(
                "subtext_min_font_size {} exceeds subtext_max_font_size {}",
                self.subtext_min_font_size, self.subtext_max_font_size
            ));
        }
        if self.subtext_max_font_size > self.max_font_size {
            return fail(format!(
                "subtext_max_font_size {} exceeds max_font_size {}",
                self.subtext_max_font_size, self.max_font_size
            ));
        }
        if !(self.line_spacing.is_finite() && self.line_spacing >= 1.0) {
            return fail(format!("line_spacing {} must be >= 1", self.line_spacing));
        }
        for (field, v) in [
            ("outline_width_em", self.outline_width_em),
            ("panel_padding_em", self.panel_padding_em),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return fail(format!("{field} {v} must be finite and >= 0"));
            }
        }
        Ok(())
    }

    /// Return `true` when a background panel is drawn behind the text.
    pub fn has_panel(&self) -> bool {
        self.panel_opacity > 0.0
    }
}

fn builtin_styles() -> Vec<Style> {
    let base = Style {
        name: "youtube".to_string(),
        font_family: "DejaVu Sans".to_string(),
        font_weight: 700,
        primary_color: Rgb8::WHITE,
        outline_color: Rgb8::BLACK,
        outline_width_em: 0.055,
        shadow: true,
        panel_color: Rgb8::BLACK,
        panel_opacity: 0.3,
        panel_full_width: true,
        panel_padding_em: 0.35,
        anchor: Anchor::centered(VerticalAnchor::Center),
        margin_fraction: 0.06,
        max_width_fraction: 0.9,
        max_height_fraction: 0.45,
        min_font_size: 28,
        max_font_size: 160,
        subtext_min_font_size: 16,
        subtext_max_font_size: 72,
        line_spacing: 1.15,
    };

    vec![
        Style {
            name: "minimalist".to_string(),
            font_weight: 400,
            outline_width_em: 0.0,
            shadow: false,
            panel_opacity: 0.5,
            panel_full_width: false,
            anchor: Anchor::centered(VerticalAnchor::Bottom),
            max_width_fraction: 0.6,
            max_height_fraction: 0.3,
            min_font_size: 24,
            max_font_size: 96,
            subtext_min_font_size: 14,
            subtext_max_font_size: 48,
            line_spacing: 1.2,
            ..base.clone()
        },
        Style {
            name: "bold".to_string(),
            primary_color: Rgb8::new(255, 215, 0),
            outline_width_em: 0.05,
            panel_opacity: 0.4,
            max_height_fraction: 0.55,
            min_font_size: 40,
            max_font_size: 200,
            subtext_min_font_size: 20,
            subtext_max_font_size: 84,
            line_spacing: 1.05,
            ..base.clone()
        },
        Style {
            name: "tech".to_string(),
            font_weight: 400,
            primary_color: Rgb8::new(0, 255, 255),
            outline_width_em: 0.047,
            panel_opacity: 0.6,
            anchor: Anchor::centered(VerticalAnchor::Top),
            max_width_fraction: 0.85,
            max_height_fraction: 0.4,
            min_font_size: 24,
            max_font_size: 128,
            subtext_min_font_size: 14,
            subtext_max_font_size: 64,
            ..base.clone()
        },
        base,
    ]
}

/// Partial style definition read from a JSON override document.
///
/// Entries naming an existing style (or carrying `extends`) only replace the fields they set;
/// brand-new styles must provide every field.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleOverride {
    name: String,
    extends: Option<String>,
    font_family: Option<String>,
    font_weight: Option<u16>,
    primary_color: Option<Rgb8>,
    outline_color: Option<Rgb8>,
    outline_width_em: Option<f32>,
    shadow: Option<bool>,
    panel_color: Option<Rgb8>,
    panel_opacity: Option<f32>,
    panel_full_width: Option<bool>,
    panel_padding_em: Option<f32>,
    anchor: Option<Anchor>,
    margin_fraction: Option<f32>,
    max_width_fraction: Option<f32>,
    max_height_fraction: Option<f32>,
    min_font_size: Option<u32>,
    max_font_size: Option<u32>,
    subtext_min_font_size: Option<u32>,
    subtext_max_font_size: Option<u32>,
    line_spacing: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideDocument {
    styles: Vec<StyleOverride>,
}

macro_rules! merge_fields {
    ($ov:ident, $dst:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = $ov.$field {
                $dst.$field = v;
            }
        )+
    };
}

impl StyleOverride {
    fn apply_to(self, mut dst: Style) -> Style {
        dst.name = self.name.clone();
        merge_fields!(
            self,
            dst,
            font_family,
            font_weight,
            primary_color,
            outline_color,
            outline_width_em,
            shadow,
            panel_color,
            panel_opacity,
            panel_full_width,
            panel_padding_em,
            anchor,
            margin_fraction,
            max_width_fraction,
            max_height_fraction,
            min_font_size,
            max_font_size,
            subtext_min_font_size,
            subtext_max_font_size,
            line_spacing,
        );
        dst
    }

    fn into_new_style(self) -> ThumbResult<Style> {
        let name = self.name;
        let missing = |field: &str| ThumbError::invalid_style(&name, format!("missing '{field}'"));
        let min_font_size = self.min_font_size.ok_or_else(|| missing("min_font_size"))?;
        let max_font_size = self.max_font_size.ok_or_else(|| missing("max_font_size"))?;
        Ok(Style {
            font_family: self.font_family.ok_or_else(|| missing("font_family"))?,
            font_weight: self.font_weight.ok_or_else(|| missing("font_weight"))?,
            primary_color: self.primary_color.ok_or_else(|| missing("primary_color"))?,
            outline_color: self.outline_color.ok_or_else(|| missing("outline_color"))?,
            outline_width_em: self
                .outline_width_em
                .ok_or_else(|| missing("outline_width_em"))?,
            shadow: self.shadow.ok_or_else(|| missing("shadow"))?,
            panel_color: self.panel_color.ok_or_else(|| missing("panel_color"))?,
            panel_opacity: self.panel_opacity.ok_or_else(|| missing("panel_opacity"))?,
            panel_full_width: self
                .panel_full_width
                .ok_or_else(|| missing("panel_full_width"))?,
            panel_padding_em: self
                .panel_padding_em
                .ok_or_else(|| missing("panel_padding_em"))?,
            anchor: self.anchor.ok_or_else(|| missing("anchor"))?,
            margin_fraction: self.margin_fraction.ok_or_else(|| missing("margin_fraction"))?,
            max_width_fraction: self
                .max_width_fraction
                .ok_or_else(|| missing("max_width_fraction"))?,
            max_height_fraction: self
                .max_height_fraction
                .ok_or_else(|| missing("max_height_fraction"))?,
            min_font_size,
            max_font_size,
            // Subtext defaults to half the caption sizes.
            subtext_min_font_size: self
                .subtext_min_font_size
                .unwrap_or((min_font_size / 2).max(1)),
            subtext_max_font_size: self
                .subtext_max_font_size
                .unwrap_or((max_font_size / 2).max(1)),
            line_spacing: self.line_spacing.ok_or_else(|| missing("line_spacing"))?,
            name,
        })
    }
}

/// Immutable catalogue of named styles.
///
/// Built once at startup and passed by reference into the engine; lookups never mutate it.
#[derive(Clone, Debug)]
pub struct StyleRegistry {
    styles: BTreeMap<String, Arc<Style>>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleRegistry {
    /// Registry holding the built-in presets: `bold`, `minimalist`, `tech`, `youtube`.
    pub fn builtin() -> Self {
        let styles = builtin_styles()
            .into_iter()
            .map(|s| (s.name.clone(), Arc::new(s)))
            .collect();
        Self { styles }
    }

    /// Build a registry from explicit styles, validating each one.
    pub fn from_styles(styles: impl IntoIterator<Item = Style>) -> ThumbResult<Self> {
        let mut out = BTreeMap::new();
        for style in styles {
            style.validate()?;
            if out.contains_key(&style.name) {
                return Err(ThumbError::invalid_style(&style.name, "defined twice"));
            }
            out.insert(style.name.clone(), Arc::new(style));
        }
        Ok(Self { styles: out })
    }

    /// Return a new registry with the styles of a JSON override document applied.
    ///
    /// Document shape: `{"styles": [{"name": "youtube", "max_font_size": 120}, ...]}`.
    pub fn with_overrides_json(&self, json: &str) -> ThumbResult<Self> {
        let doc: OverrideDocument = serde_json::from_str(json)
            .map_err(|e| ThumbError::config(format!("style override document: {e}")))?;

        let mut styles = self.styles.clone();
        for ov in doc.styles {
            let base = match (&ov.extends, styles.get(&ov.name)) {
                (Some(parent), _) => Some(
                    styles
                        .get(parent)
                        .map(|s| Style::clone(s))
                        .ok_or_else(|| self.unknown(parent))?,
                ),
                (None, Some(existing)) => Some(Style::clone(existing)),
                (None, None) => None,
            };
            let style = match base {
                Some(base) => ov.apply_to(base),
                None => ov.into_new_style()?,
            };
            style.validate()?;
            tracing::debug!(style = %style.name, "applied style override");
            styles.insert(style.name.clone(), Arc::new(style));
        }
        Ok(Self { styles })
    }

    /// Read a JSON override document from `path` and apply it.
    pub fn with_overrides_path(&self, path: impl AsRef<Path>) -> ThumbResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read style overrides from '{}'", path.display()))?;
        self.with_overrides_json(&json)
    }

    /// Look up a style by name.
    pub fn resolve(&self, name: &str) -> ThumbResult<&Style> {
        self.styles
            .get(name)
            .map(|s| s.as_ref())
            .ok_or_else(|| self.unknown(name))
    }

    /// Registered style names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Registered styles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.values().map(|s| s.as_ref())
    }

    /// Number of registered styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Return `true` when no styles are registered.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    fn unknown(&self, name: &str) -> ThumbError {
        ThumbError::UnknownStyle {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/registry.rs"]
mod tests;
