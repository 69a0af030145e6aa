use crate::foundation::core::Resolution;

/// Convenience result type used across AutoThumb.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant carries enough context (style, resolution, offending text) to reproduce the
/// failure from a log line.
#[derive(thiserror::Error, Debug)]
pub enum ThumbError {
    /// The requested style name is not in the registry.
    #[error("unknown style '{name}' (available: {available})")]
    UnknownStyle {
        /// Requested name.
        name: String,
        /// Comma-separated list of registered names.
        available: String,
    },

    /// A style definition violates its invariants.
    #[error("invalid style '{name}': {reason}")]
    InvalidStyle {
        /// Style name.
        name: String,
        /// Violated invariant.
        reason: String,
    },

    /// The caption cannot be laid out in the target box even at the minimum font size.
    #[error(
        "layout infeasible for style '{style}'{} in {box_width}x{box_height} text box: {reason} (caption: {caption:?})",
        canvas_suffix(.resolution)
    )]
    LayoutInfeasible {
        /// Style name.
        style: String,
        /// Canvas being planned, when the fit ran for a known resolution.
        resolution: Option<Resolution>,
        /// Text box width in pixels.
        box_width: u32,
        /// Text box height in pixels.
        box_height: u32,
        /// Caption that failed to fit.
        caption: String,
        /// Why the smallest size was rejected.
        reason: String,
    },

    /// Target width/height is not renderable.
    #[error("unsupported resolution {width}x{height}: {reason}")]
    UnsupportedResolution {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Why the size was rejected.
        reason: String,
    },

    /// The font named by a style could not be located or parsed.
    #[error("font load error for family '{family}' (weight {weight}): {reason}")]
    FontLoad {
        /// Requested family.
        family: String,
        /// Requested weight.
        weight: u16,
        /// What went wrong.
        reason: String,
    },

    /// Base frame bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Canvas could not be encoded or written.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid engine configuration or CLI value.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbError {
    /// Build a [`ThumbError::UnsupportedResolution`] value.
    pub fn unsupported_resolution(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::UnsupportedResolution {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Build a [`ThumbError::FontLoad`] value.
    pub fn font_load(family: impl Into<String>, weight: u16, reason: impl Into<String>) -> Self {
        Self::FontLoad {
            family: family.into(),
            weight,
            reason: reason.into(),
        }
    }

    /// Build a [`ThumbError::InvalidStyle`] value.
    pub fn invalid_style(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStyle {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ThumbError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ThumbError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ThumbError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach the canvas to a [`ThumbError::LayoutInfeasible`] that does not name one yet.
    /// Other variants are returned unchanged.
    pub fn at_resolution(self, canvas: Resolution) -> Self {
        match self {
            Self::LayoutInfeasible {
                style,
                resolution: None,
                box_width,
                box_height,
                caption,
                reason,
            } => Self::LayoutInfeasible {
                style,
                resolution: Some(canvas),
                box_width,
                box_height,
                caption,
                reason,
            },
            other => other,
        }
    }
}

fn canvas_suffix(resolution: &Option<Resolution>) -> String {
    resolution.map(|r| format!(" at {r}")).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
