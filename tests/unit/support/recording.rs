//! Test double for [`Canvas`]: records every draw call and paints measured boxes so pixel-level
//! assertions work without font files.

use super::*;

/// Advance per character, in em.
pub(crate) const ADVANCE_EM: f64 = 0.5;

#[derive(Clone, Debug)]
pub(crate) enum Op {
    Begin {
        width: u32,
        height: u32,
    },
    Fill {
        text: String,
        origin: Point,
        transform: Affine,
        paint: Paint,
        shadow: Option<Shadow>,
        size_px: f32,
    },
    Stroke {
        text: String,
        origin: Point,
        transform: Affine,
        stroke: StrokeStyle,
    },
    DrawRaster {
        x: i64,
        y: i64,
    },
}

pub(crate) struct RecordingCanvas {
    pub(crate) ops: Vec<Op>,
    pub(crate) fail_on_fill: bool,
    pub(crate) on_fill: Option<Box<dyn FnMut()>>,
    target: Raster,
    transform: Affine,
    stack: Vec<Affine>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            fail_on_fill: false,
            on_fill: None,
            target: Raster::new(0, 0),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
        }
    }

    pub(crate) fn fills(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Fill { .. }))
            .collect()
    }

    pub(crate) fn strokes(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Stroke { .. }))
            .collect()
    }

    fn paint_box(&mut self, run: &TextRun<'_>, rgba: [u8; 4]) {
        let size = f64::from(run.font.size_px);
        let w = run.text.chars().count() as f64 * size * ADVANCE_EM;
        let (top, bottom) = match run.baseline {
            TextBaseline::Middle => (run.origin.y - size / 2.0, run.origin.y + size / 2.0),
            TextBaseline::Alphabetic => (run.origin.y - size * 0.8, run.origin.y),
        };
        let rect = kurbo::Rect::new(run.origin.x, top, run.origin.x + w, bottom);
        let bbox = self.transform.transform_rect_bbox(rect);

        let x0 = bbox.x0.round().max(0.0) as u32;
        let y0 = bbox.y0.round().max(0.0) as u32;
        let x1 = (bbox.x1.round().max(0.0) as u32).min(self.target.width);
        let y1 = (bbox.y1.round().max(0.0) as u32).min(self.target.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = ((y * self.target.width + x) * 4) as usize;
                self.target.data[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }
}

impl Canvas for RecordingCanvas {
    fn begin(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        self.ops.push(Op::Begin { width, height });
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
        Ok(text.chars().count() as f64 * f64::from(font.size_px) * ADVANCE_EM)
    }

    fn fill_text(&mut self, run: &TextRun<'_>, paint: &Paint) -> CaptionResult<()> {
        if let Some(hook) = self.on_fill.as_mut() {
            hook();
        }
        if self.fail_on_fill {
            return Err(crate::CaptionError::render("recording canvas told to fail"));
        }
        self.ops.push(Op::Fill {
            text: run.text.to_owned(),
            origin: run.origin,
            transform: self.transform,
            paint: paint.clone(),
            shadow: run.shadow,
            size_px: run.font.size_px,
        });
        let rgba = match paint {
            Paint::Solid(c) => {
                let mut px = c.to_array();
                crate::foundation::math::premultiply_rgba8_in_place(&mut px);
                px
            }
            _ => [128, 128, 128, 255],
        };
        self.paint_box(run, rgba);
        Ok(())
    }

    fn stroke_text(&mut self, run: &TextRun<'_>, stroke: &StrokeStyle) -> CaptionResult<()> {
        self.ops.push(Op::Stroke {
            text: run.text.to_owned(),
            origin: run.origin,
            transform: self.transform,
            stroke: *stroke,
        });
        Ok(())
    }

    fn draw_raster(&mut self, raster: &Raster, x: i64, y: i64) -> CaptionResult<()> {
        self.ops.push(Op::DrawRaster { x, y });
        self.target.draw_over(raster, x, y);
        Ok(())
    }

    fn finish(&mut self) -> CaptionResult<Raster> {
        let (w, h) = self.target.dimensions();
        Ok(std::mem::replace(&mut self.target, Raster::new(w, h)))
    }
}
