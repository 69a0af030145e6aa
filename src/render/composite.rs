use crate::foundation::error::{ThumbError, ThumbResult};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over of a premultiplied pixel onto an opaque RGB pixel.
pub fn over_opaque(dst: [u8; 3], src: PremulRgba8) -> [u8; 3] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

/// Blend a premultiplied RGBA8 overlay onto a same-sized RGB8 buffer.
pub fn over_rgb_in_place(dst_rgb: &mut [u8], overlay_premul: &[u8]) -> ThumbResult<()> {
    if !dst_rgb.len().is_multiple_of(3)
        || !overlay_premul.len().is_multiple_of(4)
        || dst_rgb.len() / 3 != overlay_premul.len() / 4
    {
        return Err(ThumbError::encode(format!(
            "overlay of {} rgba8 bytes does not match {} rgb8 bytes",
            overlay_premul.len(),
            dst_rgb.len()
        )));
    }
    for (d, s) in dst_rgb
        .chunks_exact_mut(3)
        .zip(overlay_premul.chunks_exact(4))
    {
        if s[3] == 0 {
            continue;
        }
        let out = over_opaque([d[0], d[1], d[2]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
