use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ThumbError, ThumbResult};

/// Output canvas dimensions in pixels.
///
/// Ordered by `(width, height)` so results keyed by resolution iterate deterministically.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// 1280x720, the `720p` preset.
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
    /// 1920x1080, the `1080p` preset.
    pub const FULL_HD: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    /// Create a validated resolution with both sides > 0.
    pub fn new(width: u32, height: u32) -> ThumbResult<Self> {
        if width == 0 || height == 0 {
            return Err(ThumbError::unsupported_resolution(
                width,
                height,
                "width and height must be positive",
            ));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Swap width and height.
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Return this resolution rotated to match the orientation of a `width`x`height` source.
    ///
    /// A landscape target becomes portrait for a portrait source (and vice versa). Square
    /// targets and square sources are returned unchanged.
    pub fn oriented_like(self, width: u32, height: u32) -> Self {
        if width == height || self.width == self.height {
            return self;
        }
        let source_portrait = height > width;
        let target_portrait = self.height > self.width;
        if source_portrait == target_portrait {
            self
        } else {
            self.transposed()
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ThumbError;

    /// Parse `WIDTHxHEIGHT` or one of the presets `720p` / `1080p`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "720p" => return Ok(Self::HD),
            "1080p" => return Ok(Self::FULL_HD),
            _ => {}
        }
        let Some((w, h)) = s.split_once(['x', 'X']) else {
            return Err(ThumbError::config(format!(
                "resolution '{s}' must be WIDTHxHEIGHT, 720p or 1080p"
            )));
        };
        let parse = |part: &str| -> ThumbResult<u32> {
            part.trim().parse::<u32>().map_err(|e| {
                ThumbError::config(format!("resolution '{s}' has a bad dimension '{part}': {e}"))
            })
        };
        Self::new(parse(w)?, parse(h)?)
    }
}

/// Straight (non-premultiplied) RGB8 color.
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Opaque black.
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    /// Construct a color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> ThumbResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ThumbError::config(format!(
                "color '{s}' must be a #rrggbb hex string"
            )));
        }
        let channel = |i: usize| -> ThumbResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ThumbError::config(format!("color '{s}': {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = ThumbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb8> for String {
    fn from(value: Rgb8) -> Self {
        value.to_hex()
    }
}

/// Axis-aligned integer rectangle in canvas pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Build a rectangle from signed edges, clipped to a `canvas` sized area.
    pub fn clipped(left: i64, top: i64, right: i64, bottom: i64, canvas: Resolution) -> Self {
        let cw = i64::from(canvas.width);
        let ch = i64::from(canvas.height);
        let l = left.clamp(0, cw);
        let t = top.clamp(0, ch);
        let r = right.clamp(l, cw);
        let b = bottom.clamp(t, ch);
        Self {
            x: l as u32,
            y: t as u32,
            width: (r - l) as u32,
            height: (b - t) as u32,
        }
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Return `true` when the pixel at `(px, py)` lies inside the rectangle.
    pub fn contains(self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
