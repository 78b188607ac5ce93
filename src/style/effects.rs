use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::CaptionResult;
use crate::render::canvas::Paint;
use crate::render::raster::Raster;

/// Outline width bounds, in pixels.
pub const OUTLINE_WIDTH_RANGE: (f64, f64) = (1.0, 10.0);
/// Pattern scale bounds.
pub const PATTERN_SCALE_RANGE: (f64, f64) = (0.1, 2.0);

/// Outline (stroke) around glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineEffect {
    /// Draw the outline.
    pub enabled: bool,
    /// Stroke width in `[1, 10]`.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

impl Default for OutlineEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 2.0,
            color: Color::BLACK,
        }
    }
}

/// Gradient geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// Along a line through the text box center.
    #[default]
    Linear,
    /// Outward from the text box center.
    Radial,
}

/// One gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Stop color.
    pub color: Color,
    /// Offset along the gradient; clamped to `[0, 1]` when drawn.
    pub position: f64,
}

/// Gradient fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientEffect {
    /// Use the gradient as fill (needs at least two stops).
    pub enabled: bool,
    /// Linear or radial.
    pub kind: GradientKind,
    /// Color stops, ordered by the caller.
    pub stops: Vec<ColorStop>,
    /// Direction of a linear gradient in degrees, `[0, 360)`.
    pub angle: f64,
}

impl Default for GradientEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: GradientKind::Linear,
            stops: vec![
                ColorStop {
                    color: Color::rgb(0xff, 0x00, 0x00),
                    position: 0.0,
                },
                ColorStop {
                    color: Color::rgb(0x00, 0x00, 0xff),
                    position: 1.0,
                },
            ],
            angle: 0.0,
        }
    }
}

/// Image-pattern fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternEffect {
    /// Use the pattern as fill (needs an image).
    pub enabled: bool,
    /// Tile image. Serialized as a PNG data URL.
    #[serde(with = "crate::assets::decode::png_data_url")]
    pub image: Option<Arc<Raster>>,
    /// Tile scale in `[0.1, 2.0]`.
    pub scale: f64,
}

impl Default for PatternEffect {
    fn default() -> Self {
        Self {
            enabled: false,
            image: None,
            scale: 1.0,
        }
    }
}

/// Full effect set of an advanced text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextEffects {
    /// Solid fill, used when neither pattern nor gradient applies.
    pub fill_color: Color,
    /// Outline drawn before the fill.
    pub outline: OutlineEffect,
    /// Gradient fill.
    pub gradient: GradientEffect,
    /// Pattern fill.
    pub pattern: PatternEffect,
}

impl Default for TextEffects {
    fn default() -> Self {
        Self {
            fill_color: Color::WHITE,
            outline: OutlineEffect::default(),
            gradient: GradientEffect::default(),
            pattern: PatternEffect::default(),
        }
    }
}

/// Which fill an effect set resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillSource {
    /// Tiled pattern image.
    Pattern,
    /// Linear or radial gradient.
    Gradient,
    /// `fill_color`.
    Solid,
}

impl TextEffects {
    /// Pattern beats gradient beats solid color.
    pub fn fill_source(&self) -> FillSource {
        if self.pattern.enabled && self.pattern.image.is_some() {
            FillSource::Pattern
        } else if self.gradient.enabled && self.gradient.stops.len() >= 2 {
            FillSource::Gradient
        } else {
            FillSource::Solid
        }
    }
}

/// Copy of `effects` with every numeric field clamped or wrapped into range.
pub fn validate_effects(effects: &TextEffects) -> TextEffects {
    let mut out = effects.clone();
    out.outline.width = clamp_or(out.outline.width, OUTLINE_WIDTH_RANGE, 2.0);
    out.gradient.angle = if out.gradient.angle.is_finite() {
        let a = out.gradient.angle.rem_euclid(360.0);
        if a >= 360.0 { 0.0 } else { a }
    } else {
        0.0
    };
    for stop in &mut out.gradient.stops {
        stop.position = clamp_or(stop.position, (0.0, 1.0), 0.0);
    }
    out.pattern.scale = clamp_or(out.pattern.scale, PATTERN_SCALE_RANGE, 1.0);
    out
}

fn clamp_or(v: f64, (lo, hi): (f64, f64), nan: f64) -> f64 {
    if v.is_nan() { nan } else { v.clamp(lo, hi) }
}

/// Fill paint for text occupying `bounds` (user space).
pub fn build_fill_paint(effects: &TextEffects, bounds: Rect) -> CaptionResult<Paint> {
    match effects.fill_source() {
        FillSource::Pattern => match &effects.pattern.image {
            Some(image) => Ok(Paint::Pattern(Arc::new(scaled_pattern(
                image,
                effects.pattern.scale,
            )?))),
            None => Ok(Paint::Solid(effects.fill_color)),
        },
        FillSource::Gradient => Ok(gradient_paint(&effects.gradient, bounds)),
        FillSource::Solid => Ok(Paint::Solid(effects.fill_color)),
    }
}

fn gradient_paint(gradient: &GradientEffect, bounds: Rect) -> Paint {
    let center = bounds.center();
    let half = bounds.width().max(bounds.height()) / 2.0;
    let stops = gradient
        .stops
        .iter()
        .map(|s| (s.position.clamp(0.0, 1.0) as f32, s.color))
        .collect();
    match gradient.kind {
        GradientKind::Linear => {
            let theta = gradient.angle.to_radians();
            let (dx, dy) = (theta.cos() * half, theta.sin() * half);
            Paint::LinearGradient {
                start: Point::new(center.x - dx, center.y - dy),
                end: Point::new(center.x + dx, center.y + dy),
                stops,
            }
        }
        GradientKind::Radial => Paint::RadialGradient {
            center,
            radius: half.max(f64::EPSILON),
            stops,
        },
    }
}

/// Pattern tile rescaled by `scale` (at least one pixel per side).
pub fn scaled_pattern(image: &Raster, scale: f64) -> CaptionResult<Raster> {
    let scale = clamp_or(scale, PATTERN_SCALE_RANGE, 1.0);
    let w = ((f64::from(image.width) * scale).round() as u32).max(1);
    let h = ((f64::from(image.height) * scale).round() as u32).max(1);
    image.resized(w, h)
}

#[cfg(test)]
#[path = "../../tests/unit/style/effects.rs"]
mod tests;
