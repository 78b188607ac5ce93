//! caption-art is a text-over-photo compositing engine.
//!
//! The public API is instance-oriented:
//!
//! - Load a background (and optionally a subject mask) with [`load_image`]
//! - Create a [`Compositor`] over a [`Canvas`] ([`CpuCanvas`] in production)
//! - Render a [`TextLayer`] or [`AdvancedTextLayer`] into the compositor's surface
//! - Hand the surface to an [`Exporter`] and a [`DownloadSink`]
//!
//! All pixel buffers are premultiplied RGBA8.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod compose;
pub(crate) mod export;
pub(crate) mod placement;
pub(crate) mod presets;
pub(crate) mod render;
pub(crate) mod style;
pub(crate) mod transform;

pub use crate::foundation::core::{Affine, Point, Rect, Vec2, affine_scale_factors};
pub use crate::foundation::error::{
    BoxError, CaptionError, CaptionResult, ExportError, ExportErrorKind, LoadError,
};

pub use crate::assets::color::Color;
pub use crate::assets::decode::{
    decode_data_url, decode_image, encode_data_url, raster_from_data_url, raster_to_png_data_url,
};
pub use crate::assets::loader::{ImageFetch, ImageSource, LoadOptions, load_image};

pub use crate::render::blend::BlendMode;
pub use crate::render::canvas::{
    Canvas, FontSpec, Paint, Shadow, StrokeStyle, TextBaseline, TextRun,
};
pub use crate::render::cpu::CpuCanvas;
pub use crate::render::fonts::FontBook;
pub use crate::render::raster::Raster;

pub use crate::transform::controller::{MAX_SCALE, MIN_SCALE, Transform, TransformController};

pub use crate::style::effects::{
    ColorStop, FillSource, GradientEffect, GradientKind, OUTLINE_WIDTH_RANGE, OutlineEffect,
    PATTERN_SCALE_RANGE, PatternEffect, TextEffects, build_fill_paint, scaled_pattern,
    validate_effects,
};
pub use crate::style::layout::{
    Alignment, BlockLayout, JUSTIFY_FILL_LIMIT, LinePlacement, WordPlacement, layout_block,
    split_lines,
};
pub use crate::style::presets::{StyleDescriptor, StylePreset};
pub use crate::style::text::{
    AdvancedTextLayer, BASIC_LINE_SPACING, TextLayer, draw_advanced_text_layer, draw_text_layer,
};

pub use crate::placement::auto::{AutoPlacement, PlacementAnalysis, PlacementOpts, Region};

pub use crate::compose::cache_key::{TextLayerKey, advanced_text_layer_key, text_layer_key};
pub use crate::compose::compositor::{
    CacheStatus, Compositor, CompositorConfig, CompositorState, DEFAULT_MAX_DIMENSION,
    RenderOutcome, RenderTokens,
};
pub use crate::compose::layers::{Layer, LayerKind, LayerManager};

pub use crate::export::exporter::{
    DEFAULT_JPEG_QUALITY, EncodeTier, ExportFormat, ExportOptions, ExportOutcome, Exporter,
};
pub use crate::export::filename::{FILENAME_PREFIX, export_filename};
pub use crate::export::sink::{DirectorySink, DownloadSink, InMemoryDownloads};
pub use crate::export::watermark::{DEFAULT_WATERMARK_TEXT, apply_watermark, watermark_font_size};

pub use crate::presets::store::{JsonFilePresetStore, MemoryPresetStore, PresetStore};
