use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::foundation::error::{ThumbError, ThumbResult};

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encoded image container for thumbnails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG with best compression.
    #[default]
    Png,
    /// Baseline JPEG.
    Jpeg {
        /// Quality in `1..=100`.
        quality: u8,
    },
}

impl OutputFormat {
    /// JPEG at [`DEFAULT_JPEG_QUALITY`].
    pub fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Parse a format name (`png`, `jpg`, `jpeg`).
    pub fn parse(name: &str, jpeg_quality: u8) -> ThumbResult<Self> {
        let format = match name.trim().to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg {
                quality: jpeg_quality,
            },
            other => {
                return Err(ThumbError::config(format!(
                    "unknown output format '{other}' (expected png or jpeg)"
                )));
            }
        };
        format.validate()?;
        Ok(format)
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::parse(ext, DEFAULT_JPEG_QUALITY).ok()
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// Reject JPEG qualities outside `1..=100`.
    pub fn validate(self) -> ThumbResult<()> {
        if let Self::Jpeg { quality } = self
            && !(1..=100).contains(&quality)
        {
            return Err(ThumbError::config(format!(
                "jpeg quality must be in 1..=100, got {quality}"
            )));
        }
        Ok(())
    }
}

/// Encode an RGB canvas.
pub fn encode_image(img: &RgbImage, format: OutputFormat) -> ThumbResult<Vec<u8>> {
    format.validate()?;
    let (w, h) = img.dimensions();
    let mut out = Vec::new();
    match format {
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new_with_quality(
                &mut out,
                image::codecs::png::CompressionType::Best,
                image::codecs::png::FilterType::Adaptive,
            );
            encoder
                .write_image(img.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| ThumbError::encode(format!("png {w}x{h}: {e}")))?;
        }
        OutputFormat::Jpeg { quality } => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
            encoder
                .write_image(img.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| ThumbError::encode(format!("jpeg {w}x{h} q{quality}: {e}")))?;
        }
    }
    Ok(out)
}

/// Write `bytes` to `path` through a temporary sibling that is renamed into place.
///
/// Missing parent directories are created. On failure the temporary file is removed and `path`
/// is left as it was.
pub fn write_atomic(bytes: &[u8], path: &Path) -> ThumbResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }

    let tmp = temp_sibling(path)?;
    let mut guard = TempFileGuard(Some(tmp.clone()));
    std::fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename '{}' to '{}'", tmp.display(), path.display()))?;
    guard.0 = None;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote thumbnail");
    Ok(())
}

fn temp_sibling(path: &Path) -> ThumbResult<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ThumbError::encode(format!("output path '{}' has no file name", path.display())))?;
    Ok(path.with_file_name(format!(".{name}.{}.tmp", std::process::id())))
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image_out.rs"]
mod tests;
