use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::render::blend::{BlendMode, composite_in_place, over};

/// A raster surface: premultiplied RGBA8 pixels, tightly packed, row-major.
///
/// Cloning a raster is how the compositor takes pixel snapshots for rollback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes (`width * height * 4`).
    pub data: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; byte_len(width, height)],
        }
    }

    /// Wrap already premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> CaptionResult<Self> {
        let out = Self {
            width,
            height,
            data,
        };
        out.validate()?;
        Ok(out)
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying them.
    pub fn from_straight_rgba(width: u32, height: u32, mut data: Vec<u8>) -> CaptionResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Convert a decoded image of any color type.
    pub fn from_image(img: &image::DynamicImage) -> CaptionResult<Self> {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Self::from_straight_rgba(w, h, rgba.into_raw())
    }

    /// Decode PNG/JPEG/... bytes.
    pub fn decode(bytes: &[u8]) -> CaptionResult<Self> {
        let img = image::load_from_memory(bytes).context("decode image from memory")?;
        Self::from_image(&img)
    }

    /// Solid-color raster from a straight-alpha RGBA8 color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut out = Self::new(width, height);
        out.fill(rgba);
        out
    }

    /// Check that the raster has pixels and that the buffer matches its dimensions.
    pub fn validate(&self) -> CaptionResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptionError::validation(format!(
                "raster must have non-zero dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        if self.data.len() != byte_len(self.width, self.height) {
            return Err(CaptionError::validation(format!(
                "raster buffer is {} bytes, expected {} for {}x{} rgba8",
                self.data.len(),
                byte_len(self.width, self.height),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fill with a straight-alpha RGBA8 color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        let mut px = rgba.to_vec();
        premultiply_rgba8_in_place(&mut px);
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Scale to `width x height` with a triangle filter.
    ///
    /// Filtering happens on premultiplied data, which keeps edges of transparent regions clean.
    pub fn resized(&self, width: u32, height: u32) -> CaptionResult<Self> {
        self.validate()?;
        if width == 0 || height == 0 {
            return Err(CaptionError::validation("resize target must be non-empty"));
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let src = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| CaptionError::validation("raster buffer does not match dimensions"))?;
        let out = image::imageops::resize(
            &src,
            width,
            height,
            image::imageops::FilterType::Triangle,
        );
        Ok(Self {
            width,
            height,
            data: out.into_raw(),
        })
    }

    /// Composite `src` (same size) over this raster with `mode`.
    pub fn composite(&mut self, src: &Raster, mode: BlendMode) -> CaptionResult<()> {
        if src.dimensions() != self.dimensions() {
            return Err(CaptionError::render(format!(
                "cannot composite {}x{} onto {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        composite_in_place(&mut self.data, &src.data, mode, 1.0)
    }

    /// Source-over `src` with its top-left corner at `(x, y)`; out-of-bounds pixels are skipped.
    pub fn draw_over(&mut self, src: &Raster, x: i64, y: i64) {
        for sy in 0..src.height {
            let dy = y + i64::from(sy);
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + i64::from(sx);
                if dx < 0 || dx >= i64::from(self.width) {
                    continue;
                }
                let si = ((sy as usize) * (src.width as usize) + (sx as usize)) * 4;
                let di = ((dy as usize) * (self.width as usize) + (dx as usize)) * 4;
                let s = [
                    src.data[si],
                    src.data[si + 1],
                    src.data[si + 2],
                    src.data[si + 3],
                ];
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, s, 1.0));
            }
        }
    }

    /// Draw `src` over this raster wherever `mask` is opaque.
    ///
    /// This is the caller-side half of the text-behind-subject effect: after the compositor cut
    /// the subject's silhouette out of the text, the original subject pixels are put back on top.
    pub fn draw_masked_over(&mut self, src: &Raster, mask: &Raster) -> CaptionResult<()> {
        if src.dimensions() != self.dimensions() || mask.dimensions() != self.dimensions() {
            return Err(CaptionError::render(
                "masked draw expects source, mask and destination of equal size",
            ));
        }
        for ((d, s), m) in self
            .data
            .chunks_exact_mut(4)
            .zip(src.data.chunks_exact(4))
            .zip(mask.data.chunks_exact(4))
        {
            let out = over(
                [d[0], d[1], d[2], d[3]],
                [s[0], s[1], s[2], s[3]],
                f32::from(m[3]) / 255.0,
            );
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Straight-alpha RGBA8 copy of the pixels.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Straight-alpha `image` buffer, for encoding.
    pub fn to_rgba_image(&self) -> CaptionResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| CaptionError::validation("raster buffer does not match dimensions"))
    }

    /// Encode as PNG bytes (straight alpha).
    pub fn encode_png(&self) -> CaptionResult<Vec<u8>> {
        self.validate()?;
        let img = image::DynamicImage::ImageRgba8(self.to_rgba_image()?);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
