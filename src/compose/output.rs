use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::compose::orchestrator::CompositionReport;
use crate::encode::image_out::write_atomic;
use crate::foundation::core::Resolution;
use crate::foundation::error::{ThumbError, ThumbResult};

/// Template used when a request does not name one.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "thumbnail_{style}_{width}x{height}";

const PLACEHOLDERS: [&str; 3] = ["{width}", "{height}", "{style}"];

/// Expand `template` into one path per rendered resolution of `report`.
///
/// `{width}`, `{height}` and `{style}` are substituted. A template without placeholders gets a
/// `_WIDTHxHEIGHT` suffix before its extension when more than one image is written. Templates
/// without an extension get the one of the output format.
pub fn output_paths(
    report: &CompositionReport,
    template: &str,
) -> ThumbResult<BTreeMap<Resolution, PathBuf>> {
    let has_placeholder = PLACEHOLDERS.iter().any(|p| template.contains(p));
    let needs_suffix = !has_placeholder && report.outputs.len() > 1;

    let mut out = BTreeMap::new();
    let mut seen = BTreeMap::new();
    for (res, thumb) in &report.outputs {
        let expanded = template
            .replace("{width}", &res.width.to_string())
            .replace("{height}", &res.height.to_string())
            .replace("{style}", &report.style);
        let mut path = PathBuf::from(expanded);
        if path.file_name().is_none() {
            return Err(ThumbError::config(format!(
                "output template '{template}' does not name a file"
            )));
        }
        if needs_suffix {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = match path.extension() {
                Some(ext) => format!("{stem}_{res}.{}", ext.to_string_lossy()),
                None => format!("{stem}_{res}"),
            };
            path.set_file_name(name);
        }
        if path.extension().is_none() {
            path.set_extension(thumb.format.extension());
        }
        if let Some(other) = seen.insert(path.clone(), *res) {
            return Err(ThumbError::config(format!(
                "output template '{template}' maps {other} and {res} to the same path '{}'",
                path.display()
            )));
        }
        out.insert(*res, path);
    }
    Ok(out)
}

/// Write every rendered image of `report` according to `template`.
///
/// All paths are computed (and checked for collisions) before the first write. Each file is
/// written atomically.
#[tracing::instrument(level = "debug", skip(report), fields(style = %report.style))]
pub fn write_outputs(
    report: &CompositionReport,
    template: &str,
) -> ThumbResult<BTreeMap<Resolution, PathBuf>> {
    let paths = output_paths(report, template)?;
    for (res, path) in &paths {
        if let Some(thumb) = report.outputs.get(res) {
            write_atomic(&thumb.bytes, path)?;
        }
    }
    Ok(paths)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/output.rs"]
mod tests;
