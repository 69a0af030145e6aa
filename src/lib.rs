//! AutoThumb turns one video frame and a caption into styled thumbnails at several resolutions.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: the style name is looked up in a [`StyleRegistry`] and its font is located
//!    with a [`FontResolver`] (skipped for empty captions).
//! 2. **Fit**: per resolution, [`fit_text`] picks the largest font size at which the caption
//!    wraps into the style's text box, then [`plan_layout`] anchors the block and panel. An
//!    optional subtext is fitted with its own smaller sizes and stacked below the caption.
//! 3. **Render**: [`render_thumbnail`] cover-crops the frame and draws panel, shadow, outline
//!    and fill on the CPU.
//! 4. **Encode**: PNG or JPEG bytes, optionally written with [`write_outputs`].
//!
//! [`Composer`] runs steps 2-4 for every requested resolution on a rayon pool and reports
//! successes and failures side by side.
//!
//! Layout is deterministic: identical inputs give identical [`LayoutPlan`]s, and the fitter only
//! depends on the [`TextMeasure`] it is given, so plans can be computed without any installed
//! font using [`FixedAdvanceMeasure`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod compose;
mod encode;
mod foundation;
mod layout;
mod render;
mod style;

/// Engine configuration and logging setup.
pub mod config;

pub use assets::font::{FontResolver, LoadedFont};
pub use assets::frame::{Frame, FrameProvider, ImageFileFrameProvider};
pub use compose::orchestrator::{
    ComposeOptions, Composer, CompositionReport, CompositionRequest, RenderedThumbnail,
};
pub use compose::output::{DEFAULT_OUTPUT_TEMPLATE, output_paths, write_outputs};
pub use config::{EngineConfig, LoggingConfig, init_logging};
pub use encode::image_out::{DEFAULT_JPEG_QUALITY, OutputFormat, encode_image, write_atomic};
pub use foundation::core::{PixelRect, Resolution, Rgb8};
pub use foundation::error::{ThumbError, ThumbResult};
pub use layout::fitter::{
    ELLIPSIS, FittedText, LayoutWarning, SizeRange, TextBox, fit_text, fit_text_in, line_height_for,
};
pub use layout::measure::{FixedAdvanceMeasure, FontMeasure, TextLayoutEngine, TextMeasure};
pub use layout::plan::{LayoutPlan, SubtextBlock, place, plan_layout, plan_layout_with_subtext};
pub use render::cpu::{TextPainter, render_thumbnail};
pub use render::resample::{cover_crop, cover_rect};
pub use style::registry::{Anchor, HorizontalAnchor, Style, StyleRegistry, VerticalAnchor};
