use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::assets::frame::Frame;
use crate::foundation::core::{PixelRect, Resolution};
use crate::foundation::error::{ThumbError, ThumbResult};

/// Largest centered region of a `src_w x src_h` image with the aspect ratio of `target`.
///
/// The longer dimension (relative to the target aspect) is cropped symmetrically; the other is
/// kept whole. Zero-sized targets fail with [`ThumbError::UnsupportedResolution`] and empty
/// sources with [`ThumbError::Decode`].
pub fn cover_rect(src_w: u32, src_h: u32, target: Resolution) -> ThumbResult<PixelRect> {
    let target = Resolution::new(target.width, target.height)?;
    if src_w == 0 || src_h == 0 {
        return Err(ThumbError::decode(format!(
            "source frame {src_w}x{src_h} has no pixels"
        )));
    }
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));

    if sw * th > sh * tw {
        let crop_w = ((sh * tw + th / 2) / th).clamp(1, sw);
        Ok(PixelRect {
            x: ((sw - crop_w) / 2) as u32,
            y: 0,
            width: crop_w as u32,
            height: src_h,
        })
    } else {
        let crop_h = ((sw * th + tw / 2) / tw).clamp(1, sh);
        Ok(PixelRect {
            x: 0,
            y: ((sh - crop_h) / 2) as u32,
            width: src_w,
            height: crop_h as u32,
        })
    }
}

/// Center-crop `frame` to the aspect of `target`, then resample to exactly `target` pixels.
#[tracing::instrument(level = "debug", skip(frame), fields(src_w = frame.width, src_h = frame.height))]
pub fn cover_crop(frame: &Frame, target: Resolution) -> ThumbResult<RgbImage> {
    let rect = cover_rect(frame.width, frame.height, target)?;
    let src = frame.to_image()?;
    let cropped = imageops::crop_imm(&src, rect.x, rect.y, rect.width, rect.height).to_image();
    if cropped.dimensions() == (target.width, target.height) {
        return Ok(cropped);
    }
    Ok(imageops::resize(
        &cropped,
        target.width,
        target.height,
        FilterType::Lanczos3,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/resample.rs"]
mod tests;
