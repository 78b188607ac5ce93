//! Text watermark stamped into the bottom-right corner of an export.

use crate::assets::color::Color;
use crate::foundation::core::Point;
use crate::foundation::error::{CaptionError, CaptionResult, ExportError};
use crate::render::canvas::{Canvas, FontSpec, Paint, TextBaseline, TextRun};
use crate::render::raster::Raster;

/// Default watermark text.
pub const DEFAULT_WATERMARK_TEXT: &str = "Caption Art";

/// Distance of the text from the right and bottom edges, in pixels.
pub const WATERMARK_MARGIN: f64 = 20.0;

const WATERMARK_FONT: &str = "Arial, sans-serif";
const WATERMARK_COLOR: Color = Color::rgba(255, 255, 255, 179);

/// Font size for a surface `width` pixels wide: `width / 40`, clamped to `[12, 24]`.
pub fn watermark_font_size(width: u32) -> f32 {
    (f64::from(width) / 40.0).clamp(12.0, 24.0) as f32
}

/// Copy of `surface` with `text` drawn bottom-right, baseline `20px` above the bottom edge and
/// its right end `20px` from the right edge.
pub fn apply_watermark(
    canvas: &mut dyn Canvas,
    surface: &Raster,
    text: &str,
) -> Result<Raster, ExportError> {
    stamp(canvas, surface, text).map_err(|e| ExportError::WatermarkFailed {
        source: Box::new(e),
    })
}

fn stamp(canvas: &mut dyn Canvas, surface: &Raster, text: &str) -> CaptionResult<Raster> {
    surface.validate()?;
    if surface.is_empty() {
        return Err(CaptionError::validation("cannot watermark an empty surface"));
    }
    let (w, h) = surface.dimensions();
    canvas.begin(w, h)?;
    canvas.draw_raster(surface, 0, 0)?;

    let text = text.trim();
    if !text.is_empty() {
        let font = FontSpec::new(WATERMARK_FONT, watermark_font_size(w));
        let text_width = canvas.measure_text(text, &font)?;
        let origin = Point::new(
            f64::from(w) - text_width - WATERMARK_MARGIN,
            f64::from(h) - WATERMARK_MARGIN,
        );
        canvas.fill_text(
            &TextRun {
                text,
                font: &font,
                origin,
                baseline: TextBaseline::Alphabetic,
                shadow: None,
            },
            &Paint::Solid(WATERMARK_COLOR),
        )?;
    }
    canvas.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/export/watermark.rs"]
mod tests;
