use std::sync::Arc;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::blend::BlendMode;
use crate::render::raster::Raster;

/// Role of a layer; fixes its compositing slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    /// Scaled background image, drawn first.
    Background,
    /// Rendered text, drawn second.
    Text,
    /// Subject silhouette, cut out of everything below it.
    Mask,
}

/// One raster in the compositing stack.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Slot.
    pub kind: LayerKind,
    /// Pixels; must match the target size.
    pub surface: Arc<Raster>,
    /// Override for background/text; ignored for the mask.
    pub blend_mode: Option<BlendMode>,
}

impl Layer {
    /// Layer with the default blend for its kind.
    pub fn new(kind: LayerKind, surface: Arc<Raster>) -> Self {
        Self {
            kind,
            surface,
            blend_mode: None,
        }
    }

    /// Same layer with an explicit blend mode.
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = Some(mode);
        self
    }

    fn effective_blend(&self) -> BlendMode {
        match self.kind {
            LayerKind::Mask => BlendMode::DestinationOut,
            LayerKind::Background | LayerKind::Text => self.blend_mode.unwrap_or_default(),
        }
    }
}

/// At most one layer per [`LayerKind`], composited background, text, mask.
#[derive(Clone, Debug, Default)]
pub struct LayerManager {
    background: Option<Layer>,
    text: Option<Layer>,
    mask: Option<Layer>,
}

impl LayerManager {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: LayerKind) -> &mut Option<Layer> {
        match kind {
            LayerKind::Background => &mut self.background,
            LayerKind::Text => &mut self.text,
            LayerKind::Mask => &mut self.mask,
        }
    }

    /// Insert `layer`, replacing any layer of the same kind.
    ///
    /// The cutout blend is reserved for the mask slot.
    pub fn add(&mut self, layer: Layer) -> CaptionResult<()> {
        if layer.kind != LayerKind::Mask && layer.blend_mode == Some(BlendMode::DestinationOut) {
            return Err(CaptionError::validation(format!(
                "{:?} layer cannot use the destination-out blend",
                layer.kind
            )));
        }
        let kind = layer.kind;
        *self.slot_mut(kind) = Some(layer);
        Ok(())
    }

    /// Layer of `kind`, if present.
    pub fn get(&self, kind: LayerKind) -> Option<&Layer> {
        match kind {
            LayerKind::Background => self.background.as_ref(),
            LayerKind::Text => self.text.as_ref(),
            LayerKind::Mask => self.mask.as_ref(),
        }
    }

    /// Remove and return the layer of `kind`.
    pub fn remove(&mut self, kind: LayerKind) -> Option<Layer> {
        self.slot_mut(kind).take()
    }

    /// Drop every layer.
    pub fn clear(&mut self) {
        self.background = None;
        self.text = None;
        self.mask = None;
    }

    /// Number of layers present.
    pub fn len(&self) -> usize {
        [&self.background, &self.text, &self.mask]
            .iter()
            .filter(|l| l.is_some())
            .count()
    }

    /// `true` when no layer is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear `target`, then draw background, text and mask in that order.
    pub fn composite(&self, target: &mut Raster) -> CaptionResult<()> {
        for layer in [&self.background, &self.text, &self.mask]
            .into_iter()
            .flatten()
        {
            if layer.surface.dimensions() != target.dimensions() {
                return Err(CaptionError::render(format!(
                    "{:?} layer is {}x{}, target is {}x{}",
                    layer.kind,
                    layer.surface.width,
                    layer.surface.height,
                    target.width,
                    target.height
                )));
            }
        }

        target.clear();
        for layer in [&self.background, &self.text, &self.mask]
            .into_iter()
            .flatten()
        {
            target.composite(&layer.surface, layer.effective_blend())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layers.rs"]
mod tests;
