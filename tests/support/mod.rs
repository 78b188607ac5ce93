//! Shared integration-test helpers.
#![allow(dead_code)]

use caption_art::{
    Affine, CaptionError, CaptionResult, Canvas, FontSpec, Paint, Raster, RenderTokens,
    StrokeStyle, TextBaseline, TextRun,
};

pub const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// DejaVu Sans bytes when the font is installed.
pub fn dejavu() -> Option<Vec<u8>> {
    std::fs::read(DEJAVU).ok()
}

/// Canvas painting each run as a solid box, `0.5em` per character.
pub struct BoxCanvas {
    pub fills: Vec<(String, f64, f64, f32)>,
    pub strokes: usize,
    pub fail: bool,
    pub advance_on_fill: Option<RenderTokens>,
    target: Raster,
    transform: Affine,
    stack: Vec<Affine>,
}

impl BoxCanvas {
    pub fn new() -> Self {
        Self {
            fills: Vec::new(),
            strokes: 0,
            fail: false,
            advance_on_fill: None,
            target: Raster::new(0, 0),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
        }
    }
}

impl Canvas for BoxCanvas {
    fn begin(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        self.target = Raster::new(width, height);
        self.transform = Affine::IDENTITY;
        self.stack.clear();
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.target.dimensions()
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> CaptionResult<f64> {
        Ok(text.chars().count() as f64 * f64::from(font.size_px) * 0.5)
    }

    fn fill_text(&mut self, run: &TextRun<'_>, paint: &Paint) -> CaptionResult<()> {
        if let Some(tokens) = &self.advance_on_fill {
            tokens.advance();
        }
        if self.fail {
            return Err(CaptionError::render("box canvas failure"));
        }
        self.fills.push((
            run.text.to_owned(),
            run.origin.x,
            run.origin.y,
            run.font.size_px,
        ));
        let size = f64::from(run.font.size_px);
        let w = self.measure_text(run.text, run.font)?;
        let (top, bottom) = match run.baseline {
            TextBaseline::Middle => (run.origin.y - size / 2.0, run.origin.y + size / 2.0),
            TextBaseline::Alphabetic => (run.origin.y - size * 0.8, run.origin.y),
        };
        let bbox = self.transform.transform_rect_bbox(caption_art::Rect::new(
            run.origin.x,
            top,
            run.origin.x + w,
            bottom,
        ));
        let rgba = match paint {
            Paint::Solid(c) => c.to_array(),
            _ => [128, 128, 128, 255],
        };
        let stamp = Raster::filled(1, 1, rgba);
        let (w, h) = self.target.dimensions();
        let x0 = bbox.x0.round().max(0.0) as i64;
        let y0 = bbox.y0.round().max(0.0) as i64;
        let x1 = (bbox.x1.round() as i64).min(i64::from(w));
        let y1 = (bbox.y1.round() as i64).min(i64::from(h));
        for y in y0..y1 {
            for x in x0..x1 {
                self.target.draw_over(&stamp, x, y);
            }
        }
        Ok(())
    }

    fn stroke_text(&mut self, _run: &TextRun<'_>, _stroke: &StrokeStyle) -> CaptionResult<()> {
        self.strokes += 1;
        Ok(())
    }

    fn draw_raster(&mut self, raster: &Raster, x: i64, y: i64) -> CaptionResult<()> {
        self.target.draw_over(raster, x, y);
        Ok(())
    }

    fn finish(&mut self) -> CaptionResult<Raster> {
        let (w, h) = self.target.dimensions();
        Ok(std::mem::replace(&mut self.target, Raster::new(w, h)))
    }
}
