use serde::{Deserialize, Serialize};

use crate::foundation::core::Point;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::canvas::{Canvas, FontSpec, Paint, StrokeStyle, TextBaseline, TextRun};
use crate::style::effects::{TextEffects, build_fill_paint, validate_effects};
use crate::style::layout::{Alignment, BlockLayout, layout_block};
use crate::style::presets::StylePreset;
use crate::transform::controller::{Transform, TransformController};

/// Line spacing used for preset-styled layers.
pub const BASIC_LINE_SPACING: f64 = 1.2;

fn default_line_spacing() -> f64 {
    BASIC_LINE_SPACING
}

/// Text styled by a built-in preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Text; line breaks start new centered lines.
    pub text: String,
    /// Preset providing font, fill, outline and shadows.
    pub style_preset: StylePreset,
    /// Font size in pixels.
    pub font_size: f32,
    /// Placement.
    #[serde(default)]
    pub transform: Transform,
}

/// Text with an explicit font, alignment and effect set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvancedTextLayer {
    /// Text, may contain line breaks.
    pub text: String,
    /// CSS-like family stack.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,
    /// Horizontal alignment.
    #[serde(default)]
    pub alignment: Alignment,
    /// Outline, gradient, pattern and fill color.
    #[serde(default)]
    pub effects: TextEffects,
    /// Placement.
    #[serde(default)]
    pub transform: Transform,
}

fn check_font_size(size: f32) -> CaptionResult<()> {
    if !size.is_finite() || size <= 0.0 {
        return Err(CaptionError::validation(format!(
            "font size must be finite and > 0, got {size}"
        )));
    }
    Ok(())
}

fn with_layer_transform<R>(
    canvas: &mut dyn Canvas,
    transform: Transform,
    draw: impl FnOnce(&mut dyn Canvas) -> CaptionResult<R>,
) -> CaptionResult<R> {
    let (w, h) = canvas.size();
    canvas.save();
    TransformController::from_transform(transform).apply_to_context(canvas, w, h);
    let out = draw(canvas);
    canvas.restore();
    out
}

/// Draw a preset-styled layer onto the canvas, centered on its transform anchor.
///
/// Per line: glow passes, then the outline, then the fill carrying the preset shadow.
#[tracing::instrument(skip_all, fields(preset = %layer.style_preset, font_size = layer.font_size))]
pub fn draw_text_layer(canvas: &mut dyn Canvas, layer: &TextLayer) -> CaptionResult<BlockLayout> {
    check_font_size(layer.font_size)?;
    let style = layer.style_preset.descriptor(layer.font_size);

    with_layer_transform(canvas, layer.transform, |canvas| {
        let block = layout_block(
            canvas,
            &layer.text,
            &style.font,
            BASIC_LINE_SPACING,
            Alignment::Center,
        )?;
        let fill = Paint::Solid(style.fill);
        for line in &block.lines {
            if line.text.is_empty() {
                continue;
            }
            let mut run = TextRun {
                text: &line.text,
                font: &style.font,
                origin: Point::new(line.x, line.y),
                baseline: TextBaseline::Middle,
                shadow: None,
            };
            for glow in &style.shadow_layers {
                run.shadow = Some(*glow);
                canvas.fill_text(&run, &fill)?;
            }
            run.shadow = None;
            if let Some(stroke) = &style.stroke {
                canvas.stroke_text(&run, stroke)?;
            }
            run.shadow = style.shadow;
            canvas.fill_text(&run, &fill)?;
        }
        Ok(block)
    })
}

/// Draw an advanced layer: outline first when enabled, then the resolved fill, per line or,
/// for justified lines, per word.
#[tracing::instrument(skip_all, fields(font_size = layer.font_size, alignment = ?layer.alignment))]
pub fn draw_advanced_text_layer(
    canvas: &mut dyn Canvas,
    layer: &AdvancedTextLayer,
) -> CaptionResult<BlockLayout> {
    check_font_size(layer.font_size)?;
    let effects = validate_effects(&layer.effects);
    let font = FontSpec::new(layer.font_family.clone(), layer.font_size);

    with_layer_transform(canvas, layer.transform, |canvas| {
        let block = layout_block(
            canvas,
            &layer.text,
            &font,
            layer.line_spacing,
            layer.alignment,
        )?;
        let fill = build_fill_paint(&effects, block.bounds())?;
        let stroke = effects.outline.enabled.then_some(StrokeStyle {
            color: effects.outline.color,
            width: effects.outline.width,
        });

        for line in &block.lines {
            for (text, x) in line.segments() {
                if text.is_empty() {
                    continue;
                }
                let run = TextRun {
                    text,
                    font: &font,
                    origin: Point::new(x, line.y),
                    baseline: TextBaseline::Middle,
                    shadow: None,
                };
                if let Some(stroke) = &stroke {
                    canvas.stroke_text(&run, stroke)?;
                }
                canvas.fill_text(&run, &fill)?;
            }
        }
        Ok(block)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/style/text.rs"]
mod tests;
