use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::ImageEncoder;

use crate::assets::decode::{decode_data_url, encode_data_url};
use crate::foundation::error::{BoxError, ExportError};
use crate::export::filename::export_filename;
use crate::export::sink::DownloadSink;
use crate::export::watermark::{DEFAULT_WATERMARK_TEXT, apply_watermark};
use crate::render::canvas::Canvas;
use crate::render::cpu::CpuCanvas;
use crate::render::raster::Raster;

/// Default JPEG quality.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Output file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, keeps alpha.
    #[default]
    Png,
    /// Lossy, flattened onto black.
    Jpeg,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Export settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality in `(0, 1]`; ignored for PNG.
    pub quality: Option<f32>,
    /// Stamp a watermark before encoding.
    pub watermark: bool,
    /// Watermark text; [`DEFAULT_WATERMARK_TEXT`] when unset. Blank text disables the watermark.
    pub watermark_text: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: Some(DEFAULT_JPEG_QUALITY),
            watermark: false,
            watermark_text: None,
        }
    }
}

impl ExportOptions {
    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        let q = self
            .quality
            .filter(|q| q.is_finite() && *q > 0.0)
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .min(1.0);
        (q * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Which encoding path produced the delivered file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodeTier {
    /// Encoder output handed straight to the sink.
    Direct,
    /// Base64 data URL round trip.
    DataUrl,
}

/// Result of a successful export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Delivered file name.
    pub filename: String,
    /// Output format.
    pub format: ExportFormat,
    /// Size of the delivered file.
    pub byte_len: usize,
    /// Whether the watermark made it into the file.
    pub watermarked: bool,
    /// Path that produced the file.
    pub tier: EncodeTier,
}

/// Encodes composited surfaces and hands them to a [`DownloadSink`].
///
/// The canvas is only used to draw watermarks.
pub struct Exporter<C: Canvas = CpuCanvas> {
    canvas: C,
}

impl<C: Canvas> std::fmt::Debug for Exporter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}

impl<C: Canvas> Exporter<C> {
    /// Exporter drawing watermarks with `canvas`.
    pub fn new(canvas: C) -> Self {
        Self { canvas }
    }

    /// Watermark canvas.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Export `surface` named after the current time.
    pub fn export(
        &mut self,
        surface: &Raster,
        opts: &ExportOptions,
        sink: &mut dyn DownloadSink,
    ) -> Result<ExportOutcome, ExportError> {
        self.export_at(surface, opts, sink, Utc::now())
    }

    /// Export `surface` named after `at`.
    ///
    /// Watermark failures are logged and the export continues without one. Encoding is tried
    /// directly first; if that or delivery fails, the bytes go through a base64 data URL once more
    /// before giving up.
    #[tracing::instrument(skip_all, fields(format = ?opts.format, watermark = opts.watermark))]
    pub fn export_at(
        &mut self,
        surface: &Raster,
        opts: &ExportOptions,
        sink: &mut dyn DownloadSink,
        at: DateTime<Utc>,
    ) -> Result<ExportOutcome, ExportError> {
        let (width, height) = surface.dimensions();
        if surface.is_empty() || surface.validate().is_err() {
            return Err(ExportError::InvalidSurface { width, height });
        }

        let mut watermarked = false;
        let stamped;
        let text = opts
            .watermark_text
            .as_deref()
            .unwrap_or(DEFAULT_WATERMARK_TEXT);
        let pixels = if opts.watermark && !text.trim().is_empty() {
            match apply_watermark(&mut self.canvas, surface, text) {
                Ok(r) => {
                    watermarked = true;
                    stamped = r;
                    &stamped
                }
                Err(e) => {
                    tracing::warn!(error = %e, "watermark failed; exporting without it");
                    surface
                }
            }
        } else {
            surface
        };

        let filename = export_filename(at, watermarked, opts.format);

        let direct = encode(pixels, opts).and_then(|bytes| {
            sink.deliver(&filename, &bytes)?;
            Ok(bytes.len())
        });
        let (byte_len, tier) = match direct {
            Ok(n) => (n, EncodeTier::Direct),
            Err(e) => {
                tracing::warn!(error = %e, "direct export failed; retrying through a data url");
                (
                    export_via_data_url(pixels, opts, &filename, sink)?,
                    EncodeTier::DataUrl,
                )
            }
        };

        tracing::info!(%filename, byte_len, ?tier, "exported");
        Ok(ExportOutcome {
            filename,
            format: opts.format,
            byte_len,
            watermarked,
            tier,
        })
    }
}

fn export_via_data_url(
    pixels: &Raster,
    opts: &ExportOptions,
    filename: &str,
    sink: &mut dyn DownloadSink,
) -> Result<usize, ExportError> {
    let url = encode(pixels, opts)
        .map(|bytes| encode_data_url(opts.format.mime(), &bytes))
        .map_err(|source| ExportError::EncodeFailed { source })?;
    let (_, bytes) = decode_data_url(&url).map_err(|e| ExportError::EncodeFailed {
        source: Box::new(e),
    })?;
    sink.deliver(filename, &bytes)
        .map_err(|e| ExportError::DownloadFailed {
            filename: filename.to_owned(),
            source: Box::new(e),
        })?;
    Ok(bytes.len())
}

/// Encode premultiplied pixels: PNG keeps straight alpha, JPEG is flattened onto black.
pub(crate) fn encode(raster: &Raster, opts: &ExportOptions) -> Result<Vec<u8>, BoxError> {
    let mut buf = Vec::new();
    let (w, h) = raster.dimensions();
    match opts.format {
        ExportFormat::Png => {
            let straight = raster.to_straight_rgba8();
            image::codecs::png::PngEncoder::new(Cursor::new(&mut buf)).write_image(
                &straight,
                w,
                h,
                image::ExtendedColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg => {
            // premultiplied color over opaque black is the premultiplied color itself
            let rgb: Vec<u8> = raster
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut buf),
                opts.jpeg_quality(),
            )
            .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
