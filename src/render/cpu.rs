use std::sync::Arc;

use crate::foundation::core::{Affine, Rect, affine_scale_factors, affine_to_cpu};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::blur::blur_shadow_rgba8_premul;
use crate::render::canvas::{Canvas, FontSpec, Paint, StrokeStyle, TextBaseline, TextRun};
use crate::render::fonts::{FontBook, ShapedLine};
use crate::render::raster::Raster;

#[derive(Clone, Copy)]
enum GlyphOp<'a> {
    Fill(&'a Paint),
    Stroke(&'a StrokeStyle),
}

/// [`Canvas`] backed by `vello_cpu` glyph rasterization and `parley` shaping.
///
/// Each draw call is rasterized into a scratch pixmap covering only the pixels the glyphs can
/// reach, then composited source-over onto the surface, so calls stack in the order they are
/// issued.
pub struct CpuCanvas {
    fonts: FontBook,
    target: Raster,
    transform: Affine,
    stack: Vec<Affine>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("fonts", &self.fonts)
            .field("size", &self.target.dimensions())
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl CpuCanvas {
    /// Canvas drawing with the fonts in `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            target: Raster::new(0, 0),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            ctx: None,
        }
    }

    /// Registered fonts.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Registered fonts, for adding more.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    fn surface_size_u16(&self) -> CaptionResult<(u16, u16)> {
        let w: u16 = self
            .target
            .width
            .try_into()
            .map_err(|_| CaptionError::render("canvas width exceeds u16"))?;
        let h: u16 = self
            .target
            .height
            .try_into()
            .map_err(|_| CaptionError::render("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(CaptionError::render("canvas has no surface; call begin first"));
        }
        Ok((w, h))
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx
    }

    /// Rasterize `shaped` into a pixmap spanning its device bounds grown by `pad` pixels.
    ///
    /// Returns the pixmap with its top-left corner on the surface, or `None` when the glyphs
    /// land entirely off-surface.
    fn rasterize(
        &mut self,
        shaped: &ShapedLine,
        offset: (f32, f32),
        transform: Affine,
        op: GlyphOp<'_>,
        pad: f64,
    ) -> CaptionResult<Option<(Raster, i64, i64)>> {
        self.surface_size_u16()?;
        let line = Rect::new(
            f64::from(offset.0),
            f64::from(offset.1),
            f64::from(offset.0) + shaped.width,
            f64::from(offset.1) + shaped.height,
        );
        let Some(region) = device_region(line, transform, pad, self.target.dimensions()) else {
            return Ok(None);
        };
        let (w, h) = (region.width, region.height);
        let mut ctx = self.take_ctx(w, h);
        let local = Affine::translate((-region.x as f64, -region.y as f64)) * transform;
        ctx.set_transform(affine_to_cpu(local));
        match op {
            GlyphOp::Fill(paint) => ctx.set_paint(cpu_paint(paint)?),
            GlyphOp::Stroke(stroke) => {
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(stroke.width)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                ctx.set_paint(stroke.color.to_cpu());
            }
        }

        for run in &shaped.runs {
            let font = self
                .fonts
                .face_data(run.face)
                .ok_or_else(|| CaptionError::render("shaped run refers to an unknown face"))?;
            let glyphs = run.glyphs.iter().map(|&(id, x, y)| vello_cpu::Glyph {
                id,
                x: x + offset.0,
                y: y + offset.1,
            });
            let builder = ctx.glyph_run(font).font_size(run.font_size);
            match op {
                GlyphOp::Fill(_) => builder.fill_glyphs(glyphs),
                GlyphOp::Stroke(_) => builder.stroke_glyphs(glyphs),
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let layer = Raster::from_premul(
            u32::from(w),
            u32::from(h),
            pixmap.data_as_u8_slice().to_vec(),
        )?;
        Ok(Some((layer, region.x, region.y)))
    }

    fn layout_run(&mut self, run: &TextRun<'_>) -> CaptionResult<(Arc<ShapedLine>, (f32, f32))> {
        let shaped = self.fonts.shape(run.text, run.font)?;
        let top = match run.baseline {
            TextBaseline::Middle => run.origin.y - shaped.height / 2.0,
            TextBaseline::Alphabetic => run.origin.y - shaped.baseline,
        };
        Ok((shaped, (run.origin.x as f32, top as f32)))
    }

    fn draw_shadow(
        &mut self,
        run: &TextRun<'_>,
        shaped: &ShapedLine,
        offset: (f32, f32),
    ) -> CaptionResult<()> {
        let Some(shadow) = run.shadow else {
            return Ok(());
        };
        if shadow.color.a == 0 {
            return Ok(());
        }
        let shifted = Affine::translate((f64::from(shadow.offset_x), f64::from(shadow.offset_y)))
            * self.transform;
        let spread = if shadow.blur.is_finite() && shadow.blur > 0.0 {
            (f64::from(shadow.blur) * 1.5).ceil() + 1.0
        } else {
            0.0
        };
        let pad = glyph_pad(shaped, shifted, 0.0) + spread;
        let Some((layer, x, y)) = self.rasterize(
            shaped,
            offset,
            shifted,
            GlyphOp::Fill(&Paint::Solid(shadow.color)),
            pad,
        )?
        else {
            return Ok(());
        };
        let blurred =
            blur_shadow_rgba8_premul(&layer.data, layer.width, layer.height, shadow.blur)?;
        let blurred = Raster::from_premul(layer.width, layer.height, blurred)?;
        self.target.draw_over(&blurred, x, y);
        Ok(())
    }
}

/// Pixel box on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DeviceRegion {
    x: i64,
    y: i64,
    width: u16,
    height: u16,
}

/// Device-space bounds of `rect` under `transform`, grown by `pad` and clipped to `surface`.
fn device_region(
    rect: Rect,
    transform: Affine,
    pad: f64,
    surface: (u32, u32),
) -> Option<DeviceRegion> {
    let bbox = transform.transform_rect_bbox(rect).inflate(pad, pad);
    let x0 = bbox.x0.floor().max(0.0);
    let y0 = bbox.y0.floor().max(0.0);
    let x1 = bbox.x1.ceil().min(f64::from(surface.0));
    let y1 = bbox.y1.ceil().min(f64::from(surface.1));
    if !(x1 > x0 && y1 > y0) {
        return None;
    }
    Some(DeviceRegion {
        x: x0 as i64,
        y: y0 as i64,
        width: (x1 - x0).min(f64::from(u16::MAX)) as u16,
        height: (y1 - y0).min(f64::from(u16::MAX)) as u16,
    })
}

/// Device pixels glyph ink may reach past the line box, stroke included.
fn glyph_pad(shaped: &ShapedLine, transform: Affine, stroke_width: f64) -> f64 {
    let em = shaped
        .runs
        .iter()
        .map(|r| f64::from(r.font_size))
        .fold(0.0, f64::max);
    let (sx, sy) = affine_scale_factors(transform);
    (em * 0.5 + stroke_width) * sx.max(sy) + 2.0
}

impl Canvas for CpuCanvas {
    fn begin(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            return Err(CaptionError::validation(format!(
                "canvas size {width}x{height} is outside 1..=65535"
            )));
        }
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
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self.fonts.shape(text, font)?.width)
    }

    fn fill_text(&mut self, run: &TextRun<'_>, paint: &Paint) -> CaptionResult<()> {
        if run.text.is_empty() {
            return Ok(());
        }
        let (shaped, offset) = self.layout_run(run)?;
        self.draw_shadow(run, &shaped, offset)?;
        let pad = glyph_pad(&shaped, self.transform, 0.0);
        if let Some((layer, x, y)) =
            self.rasterize(&shaped, offset, self.transform, GlyphOp::Fill(paint), pad)?
        {
            self.target.draw_over(&layer, x, y);
        }
        Ok(())
    }

    fn stroke_text(&mut self, run: &TextRun<'_>, stroke: &StrokeStyle) -> CaptionResult<()> {
        if run.text.is_empty() || stroke.width <= 0.0 || stroke.color.a == 0 {
            return Ok(());
        }
        let (shaped, offset) = self.layout_run(run)?;
        self.draw_shadow(run, &shaped, offset)?;
        let pad = glyph_pad(&shaped, self.transform, stroke.width);
        if let Some((layer, x, y)) =
            self.rasterize(&shaped, offset, self.transform, GlyphOp::Stroke(stroke), pad)?
        {
            self.target.draw_over(&layer, x, y);
        }
        Ok(())
    }

    fn draw_raster(&mut self, raster: &Raster, x: i64, y: i64) -> CaptionResult<()> {
        raster.validate()?;
        self.target.draw_over(raster, x, y);
        Ok(())
    }

    fn finish(&mut self) -> CaptionResult<Raster> {
        self.target.validate()?;
        let (w, h) = self.target.dimensions();
        self.transform = Affine::IDENTITY;
        self.stack.clear();
        Ok(std::mem::replace(&mut self.target, Raster::new(w, h)))
    }
}

fn cpu_paint(paint: &Paint) -> CaptionResult<vello_cpu::PaintType> {
    use vello_cpu::peniko::Gradient;

    fn stops(stops: &[(f32, crate::Color)]) -> Vec<(f32, vello_cpu::peniko::Color)> {
        stops
            .iter()
            .map(|(pos, c)| (pos.clamp(0.0, 1.0), c.to_cpu()))
            .collect()
    }

    Ok(match paint {
        Paint::Solid(c) => c.to_cpu().into(),
        Paint::LinearGradient { start, end, stops: s } => {
            let stops = stops(s);
            Gradient::new_linear((start.x, start.y), (end.x, end.y))
                .with_stops(stops.as_slice())
                .into()
        }
        Paint::RadialGradient {
            center,
            radius,
            stops: s,
        } => {
            let stops = stops(s);
            Gradient::new_radial((center.x, center.y), *radius as f32)
                .with_stops(stops.as_slice())
                .into()
        }
        Paint::Pattern(raster) => {
            let pixmap = pixmap_from_raster(raster)?;
            vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler {
                    x_extend: vello_cpu::peniko::Extend::Repeat,
                    y_extend: vello_cpu::peniko::Extend::Repeat,
                    ..Default::default()
                },
            }
            .into()
        }
    })
}

fn pixmap_from_raster(raster: &Raster) -> CaptionResult<vello_cpu::Pixmap> {
    raster.validate()?;
    let w: u16 = raster
        .width
        .try_into()
        .map_err(|_| CaptionError::render("pattern width exceeds u16"))?;
    let h: u16 = raster
        .height
        .try_into()
        .map_err(|_| CaptionError::render("pattern height exceeds u16"))?;
    let pixels = raster
        .data
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
