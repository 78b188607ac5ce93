use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::compose::cache_key::{TextLayerKey, advanced_text_layer_key, text_layer_key};
use crate::compose::layers::{Layer, LayerKind, LayerManager};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::placement::auto::{AutoPlacement, PlacementOpts};
use crate::render::canvas::Canvas;
use crate::render::cpu::CpuCanvas;
use crate::render::raster::Raster;
use crate::style::layout::BlockLayout;
use crate::style::text::{AdvancedTextLayer, TextLayer, draw_advanced_text_layer, draw_text_layer};
use crate::transform::controller::Transform;

/// Default longest side of the target surface.
pub const DEFAULT_MAX_DIMENSION: u32 = 1080;

/// Inputs of one editing session.
#[derive(Clone, Debug)]
pub struct CompositorConfig {
    /// Background image at its original size.
    pub background: Raster,
    /// Subject silhouette; opaque where the subject is.
    pub mask: Option<Raster>,
    /// Cut the subject out of the text.
    pub text_behind: bool,
    /// Longest side of the target surface; backgrounds are only ever scaled down.
    pub max_dimension: u32,
}

impl CompositorConfig {
    /// Config with no mask, text-behind off and the default maximum dimension.
    pub fn new(background: Raster) -> Self {
        Self {
            background,
            mask: None,
            text_behind: false,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Lifecycle of a [`Compositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositorState {
    /// Built, nothing rendered yet.
    Constructed,
    /// Inside a render call.
    Rendering,
    /// Between render calls.
    Idle,
    /// Caches dropped; renders are refused.
    Disposed,
}

/// Result of a render call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderOutcome {
    /// The target now shows this render.
    Composited,
    /// A newer render was requested meanwhile; the target was left as it was.
    Superseded,
}

/// Shared render counter. Advancing it supersedes any render in flight.
#[derive(Clone, Debug, Default)]
pub struct RenderTokens(Arc<AtomicU64>);

impl RenderTokens {
    /// Latest issued token.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Issue a new token and return it.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}

/// Which caches currently hold a raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStatus {
    /// Scaled background.
    pub background: bool,
    /// Scaled mask.
    pub mask: bool,
    /// Rendered text layer.
    pub text: bool,
}

#[derive(Clone, Copy)]
enum TextJob<'a> {
    Basic(&'a TextLayer),
    Advanced(&'a AdvancedTextLayer),
}

impl TextJob<'_> {
    fn text(&self) -> &str {
        match self {
            Self::Basic(l) => &l.text,
            Self::Advanced(l) => &l.text,
        }
    }

    fn key(&self) -> TextLayerKey {
        match self {
            Self::Basic(l) => text_layer_key(l),
            Self::Advanced(l) => advanced_text_layer_key(l),
        }
    }

    fn draw(&self, canvas: &mut dyn Canvas) -> CaptionResult<BlockLayout> {
        match self {
            Self::Basic(l) => draw_text_layer(canvas, l),
            Self::Advanced(l) => draw_advanced_text_layer(canvas, l),
        }
    }
}

/// Owns the target surface and turns text-layer descriptions into composited frames.
///
/// The target size is fixed at construction: the background scaled down to fit
/// `max_dimension`. Renders reuse cached background, mask and text rasters where possible,
/// roll the target back on failure and step aside when a newer render was requested.
pub struct Compositor<C: Canvas = CpuCanvas> {
    canvas: C,
    background: Raster,
    mask: Option<Raster>,
    text_behind: bool,
    scale_factor: f64,
    target: Raster,
    layers: LayerManager,
    background_cache: Option<Arc<Raster>>,
    mask_cache: Option<Arc<Raster>>,
    text_cache: Option<(TextLayerKey, Arc<Raster>)>,
    last_block: Option<BlockLayout>,
    last_good: Option<Raster>,
    tokens: RenderTokens,
    state: CompositorState,
}

impl<C: Canvas> std::fmt::Debug for Compositor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("size", &self.target.dimensions())
            .field("scale_factor", &self.scale_factor)
            .field("text_behind", &self.text_behind)
            .field("has_mask", &self.mask.is_some())
            .field("state", &self.state)
            .field("cache", &self.cache_status())
            .finish_non_exhaustive()
    }
}

impl<C: Canvas> Compositor<C> {
    /// Validate `config` and size the target surface. `canvas` renders text layers.
    pub fn new(config: CompositorConfig, canvas: C) -> CaptionResult<Self> {
        if config.max_dimension == 0 {
            return Err(CaptionError::validation(
                "max_dimension must be > 0 for a non-degenerate target surface",
            ));
        }
        config
            .background
            .validate()
            .map_err(|e| CaptionError::validation(format!("background image: {e}")))?;
        if let Some(mask) = &config.mask {
            mask.validate()
                .map_err(|e| CaptionError::validation(format!("mask image: {e}")))?;
        }

        let (bw, bh) = config.background.dimensions();
        let longest = f64::from(bw.max(bh));
        let scale_factor = (f64::from(config.max_dimension) / longest).min(1.0);
        let width = ((f64::from(bw) * scale_factor).round() as u32).max(1);
        let height = ((f64::from(bh) * scale_factor).round() as u32).max(1);
        tracing::debug!(bw, bh, width, height, scale_factor, "compositor sized");

        Ok(Self {
            canvas,
            background: config.background,
            mask: config.mask,
            text_behind: config.text_behind,
            scale_factor,
            target: Raster::new(width, height),
            layers: LayerManager::new(),
            background_cache: None,
            mask_cache: None,
            text_cache: None,
            last_block: None,
            last_good: None,
            tokens: RenderTokens::default(),
            state: CompositorState::Constructed,
        })
    }

    /// Target width.
    pub fn width(&self) -> u32 {
        self.target.width
    }

    /// Target height.
    pub fn height(&self) -> u32 {
        self.target.height
    }

    /// `min(1, max_dimension / longest background side)`.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Current target pixels.
    pub fn target(&self) -> &Raster {
        &self.target
    }

    /// Lifecycle state.
    pub fn state(&self) -> CompositorState {
        self.state
    }

    /// Whether the subject is cut out of the text.
    pub fn text_behind_enabled(&self) -> bool {
        self.text_behind
    }

    /// Current mask at its original size.
    pub fn mask(&self) -> Option<&Raster> {
        self.mask.as_ref()
    }

    /// Handle to the render counter, for superseding renders from elsewhere.
    pub fn render_tokens(&self) -> RenderTokens {
        self.tokens.clone()
    }

    /// Which caches are populated.
    pub fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            background: self.background_cache.is_some(),
            mask: self.mask_cache.is_some(),
            text: self.text_cache.is_some(),
        }
    }

    /// Key of the cached text raster.
    pub fn last_text_key(&self) -> Option<TextLayerKey> {
        self.text_cache.as_ref().map(|(k, _)| *k)
    }

    /// Layout of the most recently drawn text block.
    pub fn last_text_block(&self) -> Option<&BlockLayout> {
        self.last_block.as_ref()
    }

    /// Text-rendering canvas.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Text-rendering canvas, mutable.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Render a preset-styled layer.
    #[tracing::instrument(skip_all, fields(preset = %layer.style_preset))]
    pub fn render(&mut self, layer: &TextLayer) -> CaptionResult<RenderOutcome> {
        self.run_render(TextJob::Basic(layer))
    }

    /// Render an advanced layer.
    #[tracing::instrument(skip_all, fields(alignment = ?layer.alignment))]
    pub fn render_advanced(&mut self, layer: &AdvancedTextLayer) -> CaptionResult<RenderOutcome> {
        self.run_render(TextJob::Advanced(layer))
    }

    fn run_render(&mut self, job: TextJob<'_>) -> CaptionResult<RenderOutcome> {
        if self.state == CompositorState::Disposed {
            return Err(CaptionError::validation("compositor has been disposed"));
        }
        self.state = CompositorState::Rendering;
        let snapshot = self.target.clone();
        let my_token = self.tokens.advance();

        let result = self.render_pass(job, my_token, snapshot);
        if let Err(err) = &result {
            match &self.last_good {
                Some(good) => {
                    self.target.clone_from(good);
                    tracing::warn!(error = %err, "render failed; restored last good frame");
                }
                None => tracing::warn!(error = %err, "render failed with no frame to restore"),
            }
        }
        self.state = CompositorState::Idle;
        result
    }

    fn render_pass(
        &mut self,
        job: TextJob<'_>,
        my_token: u64,
        snapshot: Raster,
    ) -> CaptionResult<RenderOutcome> {
        self.target.clear();
        self.layers.clear();

        let background = self.background_layer()?;
        self.layers
            .add(Layer::new(LayerKind::Background, background))?;

        if !job.text().trim().is_empty() {
            let text = self.text_layer(job)?;
            self.layers.add(Layer::new(LayerKind::Text, text))?;
        }

        if self.text_behind && self.mask.is_some() {
            let mask = self.mask_layer()?;
            self.layers.add(Layer::new(LayerKind::Mask, mask))?;
        }

        let current = self.tokens.current();
        if current != my_token {
            self.target = snapshot;
            tracing::debug!(my_token, current, "render superseded");
            return Ok(RenderOutcome::Superseded);
        }

        self.layers.composite(&mut self.target)?;
        self.last_good = Some(self.target.clone());
        Ok(RenderOutcome::Composited)
    }

    fn background_layer(&mut self) -> CaptionResult<Arc<Raster>> {
        if let Some(hit) = &self.background_cache {
            tracing::debug!("background cache hit");
            return Ok(Arc::clone(hit));
        }
        let scaled = Arc::new(self.background.resized(self.target.width, self.target.height)?);
        self.background_cache = Some(Arc::clone(&scaled));
        Ok(scaled)
    }

    fn mask_layer(&mut self) -> CaptionResult<Arc<Raster>> {
        if let Some(hit) = &self.mask_cache {
            tracing::debug!("mask cache hit");
            return Ok(Arc::clone(hit));
        }
        let mask = self
            .mask
            .as_ref()
            .ok_or_else(|| CaptionError::render("mask layer requested without a mask"))?;
        let scaled = Arc::new(mask.resized(self.target.width, self.target.height)?);
        self.mask_cache = Some(Arc::clone(&scaled));
        Ok(scaled)
    }

    fn text_layer(&mut self, job: TextJob<'_>) -> CaptionResult<Arc<Raster>> {
        let key = job.key();
        if let Some((cached_key, raster)) = &self.text_cache {
            if *cached_key == key {
                tracing::debug!("text cache hit");
                return Ok(Arc::clone(raster));
            }
        }
        tracing::debug!(?key, "text cache miss");

        let (w, h) = self.target.dimensions();
        self.canvas.begin(w, h)?;
        let block = job.draw(&mut self.canvas)?;
        let raster = self.canvas.finish()?;
        if raster.dimensions() != (w, h) {
            return Err(CaptionError::render(format!(
                "canvas produced {}x{} for a {w}x{h} text layer",
                raster.width, raster.height
            )));
        }
        let raster = Arc::new(raster);
        self.text_cache = Some((key, Arc::clone(&raster)));
        self.last_block = Some(block);
        Ok(raster)
    }

    /// Replace the mask (or remove it with `None`); only the mask cache is invalidated.
    pub fn set_mask_image(&mut self, mask: Option<Raster>) -> CaptionResult<()> {
        if let Some(m) = &mask {
            m.validate()
                .map_err(|e| CaptionError::validation(format!("mask image: {e}")))?;
        }
        self.mask = mask;
        self.mask_cache = None;
        Ok(())
    }

    /// Toggle the subject cutout. Caches are kept.
    pub fn set_text_behind_enabled(&mut self, enabled: bool) {
        self.text_behind = enabled;
    }

    /// Drop the background, mask and text caches.
    pub fn clear_cache(&mut self) {
        self.background_cache = None;
        self.mask_cache = None;
        self.text_cache = None;
        self.last_block = None;
    }

    /// Drop the caches and wipe the target surface.
    pub fn clear(&mut self) {
        self.clear_cache();
        self.layers.clear();
        self.target.clear();
        self.last_good = None;
    }

    /// Release caches and refuse further renders.
    pub fn dispose(&mut self) {
        self.clear_cache();
        self.layers.clear();
        self.last_good = None;
        self.state = CompositorState::Disposed;
    }

    /// Suggest a placement from the scaled background using `grid_size` pixel cells.
    ///
    /// Works on a copy; compositor state is untouched.
    pub fn auto_place(&self, grid_size: u32) -> Transform {
        self.auto_place_with(PlacementOpts {
            grid_size,
            ..PlacementOpts::default()
        })
    }

    /// [`Compositor::auto_place`] with full options.
    #[tracing::instrument(skip(self))]
    pub fn auto_place_with(&self, opts: PlacementOpts) -> Transform {
        let placer = AutoPlacement::new(opts);
        if let Some(cached) = &self.background_cache {
            return placer.suggest(cached);
        }
        match self
            .background
            .resized(self.target.width, self.target.height)
        {
            Ok(scaled) => placer.suggest(&scaled),
            Err(err) => {
                tracing::debug!(error = %err, "background could not be sampled");
                Transform::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
