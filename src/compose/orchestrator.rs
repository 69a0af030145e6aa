use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::font::{FontResolver, LoadedFont};
use crate::assets::frame::Frame;
use crate::encode::image_out::{OutputFormat, encode_image};
use crate::foundation::core::Resolution;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::layout::measure::{FixedAdvanceMeasure, FontMeasure, TextMeasure};
use crate::layout::plan::{LayoutPlan, plan_layout_with_subtext};
use crate::render::cpu::{TextPainter, render_thumbnail};
use crate::style::registry::{Style, StyleRegistry};

/// Everything needed to produce thumbnails for one caption.
#[derive(Clone, Debug)]
pub struct CompositionRequest {
    /// Already selected base frame.
    pub frame: Frame,
    /// Caption text; empty or whitespace-only renders the bare frame.
    pub caption: String,
    /// Optional smaller line set under the caption.
    pub subtext: Option<String>,
    /// Registry name of the style to apply.
    pub style: String,
    /// Target canvases. Duplicates are collapsed.
    pub resolutions: Vec<Resolution>,
    /// Encoding of every output.
    pub format: OutputFormat,
    /// Path template used by [`write_outputs`](crate::write_outputs) callers; see
    /// [`DEFAULT_OUTPUT_TEMPLATE`](crate::DEFAULT_OUTPUT_TEMPLATE).
    pub output_template: Option<String>,
}

impl CompositionRequest {
    /// Request for a single 1280x720 PNG.
    pub fn new(frame: Frame, caption: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            frame,
            caption: caption.into(),
            subtext: None,
            style: style.into(),
            resolutions: vec![Resolution::HD],
            format: OutputFormat::Png,
            output_template: None,
        }
    }

    /// Set the subtext drawn under the caption.
    pub fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = Some(subtext.into());
        self
    }

    /// Replace the target resolutions.
    pub fn with_resolutions(mut self, resolutions: impl IntoIterator<Item = Resolution>) -> Self {
        self.resolutions = resolutions.into_iter().collect();
        self
    }

    /// Replace the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output path template.
    pub fn with_output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = Some(template.into());
        self
    }
}

/// How a [`Composer`] schedules work.
#[derive(Clone, Debug)]
pub struct ComposeOptions {
    /// Render resolutions concurrently on a rayon pool.
    pub parallel: bool,
    /// Pool size; `None` lets rayon pick.
    pub threads: Option<usize>,
    /// Rotate each requested resolution to the orientation of the base frame.
    pub match_orientation: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            match_orientation: false,
        }
    }
}

/// One encoded thumbnail and the plan it was drawn from.
#[derive(Clone, Debug)]
pub struct RenderedThumbnail {
    /// Layout used for this canvas.
    pub plan: LayoutPlan,
    /// Encoding of `bytes`.
    pub format: OutputFormat,
    /// Encoded image.
    pub bytes: Vec<u8>,
}

/// Per-resolution outcome of [`Composer::compose`].
///
/// A failure at one resolution never discards the others.
#[derive(Debug, Default)]
pub struct CompositionReport {
    /// Style the outputs were rendered with.
    pub style: String,
    /// Successful renders.
    pub outputs: BTreeMap<Resolution, RenderedThumbnail>,
    /// Failed renders.
    pub failures: BTreeMap<Resolution, ThumbError>,
}

impl CompositionReport {
    /// Return `true` when every requested resolution rendered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Encoded bytes for `resolution`, if it rendered.
    pub fn bytes(&self, resolution: Resolution) -> Option<&[u8]> {
        self.outputs.get(&resolution).map(|t| t.bytes.as_slice())
    }

    /// Encoded images keyed by resolution, or the first failure.
    pub fn into_images(mut self) -> ThumbResult<BTreeMap<Resolution, Vec<u8>>> {
        if let Some((_, err)) = self.failures.pop_first() {
            return Err(err);
        }
        Ok(self
            .outputs
            .into_iter()
            .map(|(res, t)| (res, t.bytes))
            .collect())
    }
}

/// Drives style lookup, fitting, rendering and encoding for every requested resolution.
#[derive(Clone, Debug)]
pub struct Composer {
    registry: Arc<StyleRegistry>,
    fonts: FontResolver,
    options: ComposeOptions,
}

struct Worker {
    measure: FontMeasure,
    painter: TextPainter,
}

impl Worker {
    fn new(font: &LoadedFont) -> ThumbResult<Self> {
        Ok(Self {
            measure: FontMeasure::new(font)?,
            painter: TextPainter::new(font)?,
        })
    }
}

impl Composer {
    /// Composer over `registry` and `fonts` with default options.
    pub fn new(registry: StyleRegistry, fonts: FontResolver) -> Self {
        Self {
            registry: Arc::new(registry),
            fonts,
            options: ComposeOptions::default(),
        }
    }

    /// Replace the scheduling options.
    pub fn with_options(mut self, options: ComposeOptions) -> Self {
        self.options = options;
        self
    }

    /// Style catalogue in use.
    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Render `request` at every requested resolution.
    ///
    /// Fails as a whole only for problems that affect every resolution: unknown style, missing
    /// font, no resolutions, bad thread count. Everything else is reported per resolution.
    #[tracing::instrument(
        skip_all,
        fields(style = %request.style, resolutions = request.resolutions.len())
    )]
    pub fn compose(&self, request: &CompositionRequest) -> ThumbResult<CompositionReport> {
        let style = self.registry.resolve(&request.style)?;
        request.format.validate()?;
        let targets = self.targets(&request.resolutions, &request.frame)?;
        let font = self.font_for(&request.caption, request.subtext.as_deref(), style)?;

        let results: Vec<(Resolution, ThumbResult<RenderedThumbnail>)> =
            if self.options.parallel && targets.len() > 1 {
                let pool = build_thread_pool(self.options.threads)?;
                pool.install(|| {
                    targets
                        .par_iter()
                        .map_init(
                            || font.as_ref().map(Worker::new),
                            |worker, &res| {
                                (res, render_resolution(request, style, res, worker.as_mut()))
                            },
                        )
                        .collect()
                })
            } else {
                let mut worker = font.as_ref().map(Worker::new);
                targets
                    .iter()
                    .map(|&res| (res, render_resolution(request, style, res, worker.as_mut())))
                    .collect()
            };

        let mut report = CompositionReport {
            style: style.name.clone(),
            ..CompositionReport::default()
        };
        for (res, result) in results {
            match result {
                Ok(thumb) => {
                    report.outputs.insert(res, thumb);
                }
                Err(err) => {
                    tracing::warn!(resolution = %res, error = %err, "resolution failed");
                    report.failures.insert(res, err);
                }
            }
        }
        tracing::debug!(
            rendered = report.outputs.len(),
            failed = report.failures.len(),
            "composition finished"
        );
        Ok(report)
    }

    /// Compute layout plans without rendering, measuring with the style's font.
    pub fn plan(
        &self,
        caption: &str,
        subtext: Option<&str>,
        style_name: &str,
        resolutions: &[Resolution],
    ) -> ThumbResult<BTreeMap<Resolution, ThumbResult<LayoutPlan>>> {
        let style = self.registry.resolve(style_name)?;
        match self.font_for(caption, subtext, style)? {
            Some(font) => {
                let mut measure = FontMeasure::new(&font)?;
                self.plan_with(caption, subtext, style, resolutions, &mut measure)
            }
            None => self.plan_with(
                caption,
                subtext,
                style,
                resolutions,
                &mut FixedAdvanceMeasure::default(),
            ),
        }
    }

    /// Compute layout plans with an explicit measurer (no font lookup).
    pub fn plan_with(
        &self,
        caption: &str,
        subtext: Option<&str>,
        style: &Style,
        resolutions: &[Resolution],
        measure: &mut dyn TextMeasure,
    ) -> ThumbResult<BTreeMap<Resolution, ThumbResult<LayoutPlan>>> {
        let mut out = BTreeMap::new();
        for res in dedup(resolutions)? {
            out.insert(
                res,
                plan_layout_with_subtext(caption, subtext, res, style, measure),
            );
        }
        Ok(out)
    }

    fn targets(&self, requested: &[Resolution], frame: &Frame) -> ThumbResult<Vec<Resolution>> {
        let requested: Vec<Resolution> = if self.options.match_orientation {
            requested
                .iter()
                .map(|r| r.oriented_like(frame.width, frame.height))
                .collect()
        } else {
            requested.to_vec()
        };
        dedup(&requested)
    }

    fn font_for(
        &self,
        caption: &str,
        subtext: Option<&str>,
        style: &Style,
    ) -> ThumbResult<Option<LoadedFont>> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(caption) && subtext.is_none_or(blank) {
            return Ok(None);
        }
        let font = self.fonts.resolve(&style.font_family, style.font_weight)?;
        // Fail once here instead of once per worker when the bytes cannot be shaped.
        Worker::new(&font)?;
        Ok(Some(font))
    }
}

fn render_resolution(
    request: &CompositionRequest,
    style: &Style,
    res: Resolution,
    worker: Option<&mut ThumbResult<Worker>>,
) -> ThumbResult<RenderedThumbnail> {
    let _span = tracing::debug_span!("render_resolution", resolution = %res).entered();
    let worker = match worker {
        Some(Ok(w)) => Some(w),
        Some(Err(e)) => {
            return Err(ThumbError::font_load(
                &style.font_family,
                style.font_weight,
                format!("worker text context: {e}"),
            ));
        }
        None => None,
    };

    let subtext = request.subtext.as_deref();
    let (plan, painter) = match worker {
        Some(w) => (
            plan_layout_with_subtext(&request.caption, subtext, res, style, &mut w.measure)?,
            Some(&mut w.painter),
        ),
        None => (
            plan_layout_with_subtext(
                &request.caption,
                subtext,
                res,
                style,
                &mut FixedAdvanceMeasure::default(),
            )?,
            None,
        ),
    };
    tracing::debug!(font_size = plan.font_size, lines = plan.lines.len(), "planned");

    let canvas = render_thumbnail(&request.frame, &plan, style, painter)?;
    let bytes = encode_image(&canvas, request.format)?;
    Ok(RenderedThumbnail {
        plan,
        format: request.format,
        bytes,
    })
}

fn dedup(resolutions: &[Resolution]) -> ThumbResult<Vec<Resolution>> {
    if resolutions.is_empty() {
        return Err(ThumbError::config("at least one resolution is required"));
    }
    let unique: BTreeSet<Resolution> = resolutions.iter().copied().collect();
    Ok(unique.into_iter().collect())
}

fn build_thread_pool(threads: Option<usize>) -> ThumbResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ThumbError::config("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ThumbError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/orchestrator.rs"]
mod tests;
