use std::sync::Arc;

use crate::assets::color::Color;
use crate::foundation::core::{Affine, Point};
use crate::foundation::error::CaptionResult;
use crate::render::raster::Raster;

/// Font request: a CSS-like family stack plus size, weight and slant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Comma separated family names, most preferred first (`"Impact, sans-serif"`).
    pub family: String,
    /// Size in pixels.
    pub size_px: f32,
    /// CSS weight (400 regular, 700 bold).
    #[serde(default = "default_weight")]
    pub weight: u16,
    /// Italic face requested.
    #[serde(default)]
    pub italic: bool,
}

fn default_weight() -> u16 {
    400
}

impl FontSpec {
    /// Regular-weight font.
    pub fn new(family: impl Into<String>, size_px: f32) -> Self {
        Self {
            family: family.into(),
            size_px,
            weight: 400,
            italic: false,
        }
    }

    /// Same font with weight 700.
    pub fn bold(mut self) -> Self {
        self.weight = 700;
        self
    }

    /// Same font, italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Vertical anchor of a text run relative to its origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Origin is the vertical middle of the line box.
    #[default]
    Middle,
    /// Origin sits on the alphabetic baseline.
    Alphabetic,
}

/// Blurred, offset copy drawn underneath a text run.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Blur amount in pixels (gaussian sigma is half of it).
    pub blur: f32,
    /// Horizontal offset in device pixels.
    #[serde(default)]
    pub offset_x: f32,
    /// Vertical offset in device pixels.
    #[serde(default)]
    pub offset_y: f32,
}

/// Fill source for glyphs.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Single color.
    Solid(Color),
    /// Linear gradient between two points in user space.
    LinearGradient {
        /// Start point (offset 0).
        start: Point,
        /// End point (offset 1).
        end: Point,
        /// `(offset, color)` stops, offsets in `[0, 1]`.
        stops: Vec<(f32, Color)>,
    },
    /// Radial gradient in user space.
    RadialGradient {
        /// Center (offset 0).
        center: Point,
        /// Radius (offset 1).
        radius: f64,
        /// `(offset, color)` stops, offsets in `[0, 1]`.
        stops: Vec<(f32, Color)>,
    },
    /// Image repeated on both axes, anchored at the user-space origin.
    Pattern(Arc<Raster>),
}

/// Stroke parameters for outlined glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Line width in user-space pixels.
    pub width: f64,
}

/// One line or word of text to draw.
#[derive(Clone, Debug)]
pub struct TextRun<'a> {
    /// Text content, without line breaks.
    pub text: &'a str,
    /// Font.
    pub font: &'a FontSpec,
    /// Left edge of the run, vertically anchored per `baseline`.
    pub origin: Point,
    /// Vertical anchoring.
    pub baseline: TextBaseline,
    /// Optional shadow drawn underneath.
    pub shadow: Option<Shadow>,
}

/// Drawing context for a raster surface.
///
/// The rendering pipeline only talks to this trait. [`crate::CpuCanvas`] is the production
/// implementation; hosts may provide their own (for instance one backed by a platform text
/// stack).
pub trait Canvas {
    /// Start a fresh, fully transparent `width x height` surface with an identity transform.
    fn begin(&mut self, width: u32, height: u32) -> CaptionResult<()>;

    /// Current surface size.
    fn size(&self) -> (u32, u32);

    /// Current user-to-device transform.
    fn transform(&self) -> Affine;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Push the current transform.
    fn save(&mut self);

    /// Pop the transform pushed by the matching [`Canvas::save`]; no-op on an empty stack.
    fn restore(&mut self);

    /// Advance width of `text` in user-space pixels.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> CaptionResult<f64>;

    /// Fill glyphs of `run` with `paint`.
    fn fill_text(&mut self, run: &TextRun<'_>, paint: &Paint) -> CaptionResult<()>;

    /// Stroke glyph outlines of `run`.
    fn stroke_text(&mut self, run: &TextRun<'_>, stroke: &StrokeStyle) -> CaptionResult<()>;

    /// Source-over `raster` at device position `(x, y)`, ignoring the current transform.
    fn draw_raster(&mut self, raster: &Raster, x: i64, y: i64) -> CaptionResult<()>;

    /// Hand out the finished surface and reset to an empty one of the same size.
    fn finish(&mut self) -> CaptionResult<Raster>;

    /// Post-multiply a translation.
    fn translate(&mut self, x: f64, y: f64) {
        let t = self.transform() * Affine::translate((x, y));
        self.set_transform(t);
    }

    /// Post-multiply a rotation (radians, clockwise in a y-down space).
    fn rotate(&mut self, radians: f64) {
        let t = self.transform() * Affine::rotate(radians);
        self.set_transform(t);
    }

    /// Post-multiply a scale.
    fn scale(&mut self, sx: f64, sy: f64) {
        let t = self.transform() * Affine::scale_non_uniform(sx, sy);
        self.set_transform(t);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/support/recording.rs"]
pub(crate) mod recording;
