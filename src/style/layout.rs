use smallvec::SmallVec;

use crate::foundation::core::Rect;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::canvas::{Canvas, FontSpec};

/// Lines whose natural width reaches this share of the block width are not justified.
pub const JUSTIFY_FILL_LIMIT: f64 = 0.95;

/// Horizontal alignment of lines inside a text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Line start on the block's left edge.
    Left,
    /// Each line centered on its own.
    #[default]
    Center,
    /// Line end on the block's right edge.
    Right,
    /// Extra width spread across the gaps between words.
    Justify,
}

/// Split on `\r\n`, `\n` or `\r`. Always yields at least one (possibly empty) line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = text;
    loop {
        match rest.find(['\r', '\n']) {
            Some(i) => {
                out.push(&rest[..i]);
                let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[i + skip..];
            }
            None => {
                out.push(rest);
                return out;
            }
        }
    }
}

/// A word of a justified line.
#[derive(Clone, Debug, PartialEq)]
pub struct WordPlacement {
    /// Word text.
    pub text: String,
    /// Left edge relative to the block anchor.
    pub x: f64,
}

/// One laid out line. Coordinates are relative to the block anchor (the block's center).
#[derive(Clone, Debug, PartialEq)]
pub struct LinePlacement {
    /// Line text.
    pub text: String,
    /// Left edge of the line.
    pub x: f64,
    /// Vertical middle of the line.
    pub y: f64,
    /// Natural (measured) width.
    pub width: f64,
    /// Word positions when the line is justified; empty otherwise.
    pub words: SmallVec<[WordPlacement; 8]>,
}

impl LinePlacement {
    /// `(text, left edge)` segments to draw: the words of a justified line, else the whole line.
    pub fn segments(&self) -> Vec<(&str, f64)> {
        if self.words.is_empty() {
            vec![(self.text.as_str(), self.x)]
        } else {
            self.words.iter().map(|w| (w.text.as_str(), w.x)).collect()
        }
    }
}

/// Multi-line text block centered on its anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockLayout {
    /// Lines, top to bottom.
    pub lines: Vec<LinePlacement>,
    /// Widest natural line width.
    pub width: f64,
    /// `line_height * lines.len()`.
    pub height: f64,
    /// `font_size * line_spacing`.
    pub line_height: f64,
}

impl BlockLayout {
    /// Block bounds relative to the anchor.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            -self.width / 2.0,
            -self.height / 2.0,
            self.width / 2.0,
            self.height / 2.0,
        )
    }
}

/// Measure and position every line of `text` around the anchor.
pub fn layout_block(
    canvas: &mut dyn Canvas,
    text: &str,
    font: &FontSpec,
    line_spacing: f64,
    alignment: Alignment,
) -> CaptionResult<BlockLayout> {
    if !line_spacing.is_finite() || line_spacing <= 0.0 {
        return Err(CaptionError::validation(
            "line spacing must be finite and > 0",
        ));
    }
    let lines = split_lines(text);
    let widths = lines
        .iter()
        .map(|l| canvas.measure_text(l, font))
        .collect::<CaptionResult<Vec<f64>>>()?;

    let block_width = widths.iter().copied().fold(0.0, f64::max);
    let line_height = f64::from(font.size_px) * line_spacing;
    let height = line_height * lines.len() as f64;
    let left = -block_width / 2.0;
    let top = -height / 2.0;

    let mut placed = Vec::with_capacity(lines.len());
    for (i, (line, &width)) in lines.iter().zip(&widths).enumerate() {
        let y = top + line_height * (i as f64 + 0.5);
        let mut words = SmallVec::new();
        let x = match alignment {
            Alignment::Left => left,
            Alignment::Right => left + block_width - width,
            Alignment::Center => -width / 2.0,
            Alignment::Justify => {
                words = justify_words(canvas, line, font, width, block_width, left)?;
                left
            }
        };
        placed.push(LinePlacement {
            text: (*line).to_owned(),
            x,
            y,
            width,
            words,
        });
    }

    Ok(BlockLayout {
        lines: placed,
        width: block_width,
        height,
        line_height,
    })
}

fn justify_words(
    canvas: &mut dyn Canvas,
    line: &str,
    font: &FontSpec,
    natural: f64,
    block_width: f64,
    left: f64,
) -> CaptionResult<SmallVec<[WordPlacement; 8]>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() < 2 || natural >= block_width * JUSTIFY_FILL_LIMIT {
        return Ok(SmallVec::new());
    }
    let word_widths = words
        .iter()
        .map(|w| canvas.measure_text(w, font))
        .collect::<CaptionResult<Vec<f64>>>()?;

    let gaps = (words.len() - 1) as f64;
    let natural_gap = ((natural - word_widths.iter().sum::<f64>()) / gaps).max(0.0);
    let extra = (block_width - natural) / gaps;

    let mut x = left;
    let mut out = SmallVec::with_capacity(words.len());
    for (word, w) in words.iter().zip(&word_widths) {
        out.push(WordPlacement {
            text: (*word).to_owned(),
            x,
        });
        x += w + natural_gap + extra;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/style/layout.rs"]
mod tests;
