use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ThumbError, ThumbResult};

/// Decoded base frame as tightly packed, row-major RGB8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGB8 bytes, `width * height * 3` long.
    pub rgb8: Arc<Vec<u8>>,
}

impl Frame {
    /// Wrap raw RGB8 pixels, checking the buffer length.
    pub fn from_rgb8(width: u32, height: u32, rgb8: Vec<u8>) -> ThumbResult<Self> {
        if width == 0 || height == 0 {
            return Err(ThumbError::decode(format!(
                "frame must be non-empty, got {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(3);
        if rgb8.len() != expected {
            return Err(ThumbError::decode(format!(
                "frame {width}x{height} expects {expected} RGB8 bytes, got {}",
                rgb8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgb8: Arc::new(rgb8),
        })
    }

    /// Decode an encoded still image (PNG, JPEG, ...) into RGB8, dropping any alpha channel.
    pub fn decode(bytes: &[u8]) -> ThumbResult<Self> {
        let dyn_img = image::load_from_memory(bytes)
            .map_err(|e| ThumbError::decode(format!("decode image from memory: {e}")))?;
        let rgb = dyn_img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb8(width, height, rgb.into_raw())
    }

    /// A single-color frame, handy for previews and tests.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> ThumbResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(n.saturating_mul(3));
        for _ in 0..n {
            bytes.extend_from_slice(&rgb);
        }
        Self::from_rgb8(width, height, bytes)
    }

    /// Borrow the pixels as an `image` buffer.
    pub(crate) fn to_image(&self) -> ThumbResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.rgb8.as_ref().clone())
            .ok_or_else(|| ThumbError::decode("frame buffer does not match its dimensions"))
    }
}

/// Source of the already-selected base frame.
///
/// Video decoding and frame selection live outside the engine; implementations hand over
/// decoded pixels only.
pub trait FrameProvider {
    /// Return the chosen frame.
    fn get_selected_frame(&self) -> ThumbResult<Frame>;
}

/// Frame provider reading a still image that an external tool already extracted.
#[derive(Clone, Debug)]
pub struct ImageFileFrameProvider {
    path: PathBuf,
}

impl ImageFileFrameProvider {
    /// Provider for the image at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Image path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameProvider for ImageFileFrameProvider {
    fn get_selected_frame(&self) -> ThumbResult<Frame> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read frame image '{}'", self.path.display()))?;
        let frame = Frame::decode(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            width = frame.width,
            height = frame.height,
            "loaded base frame"
        );
        Ok(frame)
    }
}

impl FrameProvider for Frame {
    fn get_selected_frame(&self) -> ThumbResult<Frame> {
        Ok(self.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frame.rs"]
mod tests;
