//! Caption fitting.
//!
//! The search runs over the integer font sizes `[min_font_size, max_font_size]` of a style. A size
//! is feasible when the greedily wrapped caption fits the box height; smaller sizes are never
//! less feasible than larger ones, so the largest feasible size is found by binary search. The
//! winning size is then re-wrapped into the same number of lines with the most even line
//! lengths.

use crate::foundation::core::Resolution;
use crate::foundation::error::{ThumbError, ThumbResult};
use crate::layout::measure::TextMeasure;
use crate::style::registry::Style;

/// Marker appended to a word that had to be cut to fit the box.
pub const ELLIPSIS: char = '\u{2026}';

/// Area, in pixels, that the caption block may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextBox {
    /// Maximum line width.
    pub width: u32,
    /// Maximum block height.
    pub height: u32,
}

impl TextBox {
    /// Box implied by a canvas size and the style's width/height fractions, rounded to whole
    /// pixels.
    pub fn for_canvas(canvas: Resolution, style: &Style) -> Self {
        let scale = |px: u32, frac: f32| (f64::from(px) * f64::from(frac)).round() as u32;
        Self {
            width: scale(canvas.width, style.max_width_fraction),
            height: scale(canvas.height, style.max_height_fraction),
        }
    }
}

/// Non-fatal condition reported alongside a successful fit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LayoutWarning {
    /// A word wider than the box at the minimum size was cut and suffixed with an ellipsis.
    TextTruncated {
        /// Word as it appeared in the caption.
        original: String,
        /// Word as it will be drawn.
        truncated: String,
        /// Font size the cut was made at.
        font_size: u32,
    },
}

/// Font size and line breaks chosen for a caption.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FittedText {
    /// Chosen font size in pixels.
    pub font_size: u32,
    /// Line advance in pixels at `font_size`.
    pub line_height: u32,
    /// Lines in reading order, words joined by single spaces.
    pub lines: Vec<String>,
    /// Measured width of each line.
    pub line_widths: Vec<f32>,
    /// Non-fatal conditions hit while fitting.
    pub warnings: Vec<LayoutWarning>,
}

impl FittedText {
    /// Total block height (`lines * line_height`).
    pub fn block_height(&self) -> u32 {
        self.line_height.saturating_mul(self.lines.len() as u32)
    }

    /// Widest line, rounded up to whole pixels.
    pub fn block_width(&self) -> u32 {
        self.line_widths
            .iter()
            .fold(0.0f32, |acc, w| acc.max(*w))
            .ceil() as u32
    }

    /// Return `true` when a word had to be truncated.
    pub fn is_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::TextTruncated { .. }))
    }
}

/// Line advance for `size_px` under `style`.
pub fn line_height_for(style: &Style, size_px: u32) -> u32 {
    (f64::from(size_px) * f64::from(style.line_spacing)).ceil() as u32
}

/// Inclusive range of integer font sizes the search may pick from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeRange {
    /// Smallest size; the only size at which words get truncated.
    pub min: u32,
    /// Largest size.
    pub max: u32,
}

impl SizeRange {
    /// Main caption sizes of `style`.
    pub fn caption(style: &Style) -> Self {
        Self {
            min: style.min_font_size,
            max: style.max_font_size,
        }
    }

    /// Subtext sizes of `style`.
    pub fn subtext(style: &Style) -> Self {
        Self {
            min: style.subtext_min_font_size,
            max: style.subtext_max_font_size,
        }
    }
}

/// Fit `caption` into `text_box` using the sizes allowed by `style`.
///
/// Returns [`ThumbError::LayoutInfeasible`] when even `min_font_size` cannot fit. A whitespace-only
/// caption yields an empty fit at the minimum size.
pub fn fit_text(
    caption: &str,
    text_box: TextBox,
    style: &Style,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<FittedText> {
    fit_text_in(caption, text_box, style, SizeRange::caption(style), measure)
}

/// [`fit_text`] over an explicit size range; colors and line spacing still come from `style`.
#[tracing::instrument(level = "debug", skip(style, measure), fields(style = %style.name))]
pub fn fit_text_in(
    caption: &str,
    text_box: TextBox,
    style: &Style,
    sizes: SizeRange,
    measure: &mut dyn TextMeasure,
) -> ThumbResult<FittedText> {
    let words: Vec<&str> = caption.split_whitespace().collect();
    if words.is_empty() {
        return Ok(FittedText {
            font_size: sizes.min,
            line_height: line_height_for(style, sizes.min),
            lines: Vec::new(),
            line_widths: Vec::new(),
            warnings: Vec::new(),
        });
    }

    let mut fitter = Fitter {
        words: &words,
        text_box,
        style,
        min_size: sizes.min,
        measure,
    };

    let min = sizes.min;
    let max = sizes.max.max(min);
    if let Candidate::TooBig { reason } = fitter.try_size(min)? {
        return Err(ThumbError::LayoutInfeasible {
            style: style.name.clone(),
            resolution: None,
            box_width: text_box.width,
            box_height: text_box.height,
            caption: caption.to_string(),
            reason,
        });
    }

    let mut lo = min;
    let mut hi = max;
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if matches!(fitter.try_size(mid)?, Candidate::Fits { .. }) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let size = lo;
    let (tokens, line_count, warnings) = match fitter.try_size(size)? {
        Candidate::Fits {
            words,
            line_count,
            warnings,
        } => (words, line_count, warnings),
        Candidate::TooBig { reason } => {
            return Err(ThumbError::Other(anyhow::anyhow!(
                "size {size} settled by the search is not feasible: {reason}"
            )));
        }
    };

    let lines = fitter.balanced_lines(&tokens, size, line_count)?;
    let mut line_widths = Vec::with_capacity(lines.len());
    for line in &lines {
        line_widths.push(fitter.measure.line_width(line, size)?);
    }
    for w in &warnings {
        if let LayoutWarning::TextTruncated {
            original,
            truncated,
            ..
        } = w
        {
            tracing::warn!(%original, %truncated, size, "caption word truncated to fit");
        }
    }
    tracing::debug!(size, lines = lines.len(), "caption fitted");

    Ok(FittedText {
        font_size: size,
        line_height: line_height_for(style, size),
        lines,
        line_widths,
        warnings,
    })
}

enum Candidate {
    Fits {
        words: Vec<String>,
        line_count: usize,
        warnings: Vec<LayoutWarning>,
    },
    TooBig {
        reason: String,
    },
}

struct Fitter<'a> {
    words: &'a [&'a str],
    text_box: TextBox,
    style: &'a Style,
    min_size: u32,
    measure: &'a mut dyn TextMeasure,
}

impl Fitter<'_> {
    fn box_width(&self) -> f32 {
        self.text_box.width as f32
    }

    /// Feasibility predicate for one font size.
    fn try_size(&mut self, size: u32) -> ThumbResult<Candidate> {
        let at_min = size == self.min_size;
        let mut tokens = Vec::with_capacity(self.words.len());
        let mut warnings = Vec::new();
        for &word in self.words {
            if self.measure.line_width(word, size)? <= self.box_width() {
                tokens.push(word.to_string());
                continue;
            }
            if !at_min {
                return Ok(Candidate::TooBig {
                    reason: format!("word {word:?} is wider than the box at size {size}"),
                });
            }
            let Some(cut) = self.truncate_word(word, size)? else {
                return Ok(Candidate::TooBig {
                    reason: format!(
                        "box is narrower than a truncated word at minimum size {size}"
                    ),
                });
            };
            warnings.push(LayoutWarning::TextTruncated {
                original: word.to_string(),
                truncated: cut.clone(),
                font_size: size,
            });
            tokens.push(cut);
        }

        let line_count = self.greedy_line_count(&tokens, size)?;
        let line_height = line_height_for(self.style, size);
        let needed = u64::from(line_height) * line_count as u64;
        if needed > u64::from(self.text_box.height) {
            return Ok(Candidate::TooBig {
                reason: format!(
                    "{line_count} line(s) need {needed}px at size {size}, box has {}px",
                    self.text_box.height
                ),
            });
        }
        Ok(Candidate::Fits {
            words: tokens,
            line_count,
            warnings,
        })
    }

    /// Longest prefix of `word` that fits the box once the ellipsis is appended.
    fn truncate_word(&mut self, word: &str, size: u32) -> ThumbResult<Option<String>> {
        let chars: Vec<char> = word.chars().collect();
        for keep in (0..chars.len()).rev() {
            let mut cut: String = chars[..keep].iter().collect();
            cut.push(ELLIPSIS);
            if self.measure.line_width(&cut, size)? <= self.box_width() {
                return Ok(Some(cut));
            }
        }
        Ok(None)
    }

    fn greedy_line_count(&mut self, tokens: &[String], size: u32) -> ThumbResult<usize> {
        let mut lines = 0usize;
        let mut current = String::new();
        for token in tokens {
            if current.is_empty() {
                current.push_str(token);
                continue;
            }
            let candidate = format!("{current} {token}");
            if self.measure.line_width(&candidate, size)? <= self.box_width() {
                current = candidate;
            } else {
                lines += 1;
                current.clear();
                current.push_str(token);
            }
        }
        if !current.is_empty() {
            lines += 1;
        }
        Ok(lines)
    }

    /// Split `tokens` into exactly `line_count` lines that fit the box, minimizing the sum of
    /// squared line lengths (in characters). Ties keep the earliest break.
    fn balanced_lines(
        &mut self,
        tokens: &[String],
        size: u32,
        line_count: usize,
    ) -> ThumbResult<Vec<String>> {
        let n = tokens.len();
        let char_len: Vec<u64> = tokens.iter().map(|t| t.chars().count() as u64).collect();

        // span_end[i] = largest j such that tokens[i..j] fits on one line.
        let mut span_end = vec![0usize; n];
        for i in 0..n {
            let mut line = String::new();
            let mut end = i + 1;
            for (j, token) in tokens.iter().enumerate().skip(i) {
                if j > i {
                    line.push(' ');
                }
                line.push_str(token);
                if j > i && self.measure.line_width(&line, size)? > self.box_width() {
                    break;
                }
                end = j + 1;
            }
            span_end[i] = end;
        }

        let span_chars = |i: usize, j: usize| -> u64 {
            char_len[i..j].iter().sum::<u64>() + (j - i - 1) as u64
        };

        const UNREACHABLE: u64 = u64::MAX;
        let mut cost = vec![vec![UNREACHABLE; n + 1]; line_count + 1];
        let mut parent = vec![vec![0usize; n + 1]; line_count + 1];
        cost[0][0] = 0;
        for l in 1..=line_count {
            for j in l..=n {
                for i in (l - 1)..j {
                    if cost[l - 1][i] == UNREACHABLE || span_end[i] < j {
                        continue;
                    }
                    let len = span_chars(i, j);
                    let c = cost[l - 1][i] + len * len;
                    if c < cost[l][j] {
                        cost[l][j] = c;
                        parent[l][j] = i;
                    }
                }
            }
        }

        if cost[line_count][n] == UNREACHABLE {
            return Err(ThumbError::Other(anyhow::anyhow!(
                "no {line_count}-line wrapping exists at size {size} although greedy wrapping found one"
            )));
        }

        let mut lines = Vec::with_capacity(line_count);
        let mut j = n;
        for l in (1..=line_count).rev() {
            let i = parent[l][j];
            lines.push(tokens[i..j].join(" "));
            j = i;
        }
        lines.reverse();
        Ok(lines)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fitter.rs"]
mod tests;
