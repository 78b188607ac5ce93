use xxhash_rust::xxh3::Xxh3;

use crate::assets::color::Color;
use crate::style::effects::{GradientKind, TextEffects};
use crate::style::layout::Alignment;
use crate::style::text::{AdvancedTextLayer, TextLayer};
use crate::transform::controller::Transform;

const XXH3_SEED: u64 = 0x3c6e_f372_fe94_f82b;

/// Structural key over every field that affects a text layer's pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextLayerKey {
    /// High 64 bits of the xxh3-128 digest.
    pub hi: u64,
    /// Low 64 bits of the xxh3-128 digest.
    pub lo: u64,
}

/// Key of a preset-styled layer: text, preset, font size and transform.
pub fn text_layer_key(layer: &TextLayer) -> TextLayerKey {
    let mut h = StableHasher::new();
    h.write_u8(0);
    h.write_str(&layer.text);
    h.write_str(layer.style_preset.id());
    h.write_f32(layer.font_size);
    write_transform(&mut h, &layer.transform);
    h.finish()
}

/// Key of an advanced layer: text, font family and size, line spacing, alignment, effects and
/// transform.
pub fn advanced_text_layer_key(layer: &AdvancedTextLayer) -> TextLayerKey {
    let mut h = StableHasher::new();
    h.write_u8(1);
    h.write_str(&layer.text);
    h.write_str(&layer.font_family);
    h.write_f32(layer.font_size);
    h.write_f64(layer.line_spacing);
    h.write_u8(match layer.alignment {
        Alignment::Left => 0,
        Alignment::Center => 1,
        Alignment::Right => 2,
        Alignment::Justify => 3,
    });
    write_effects(&mut h, &layer.effects);
    write_transform(&mut h, &layer.transform);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    // Length-prefixed so adjacent strings cannot run into each other.
    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn write_color(&mut self, c: Color) {
        self.write_bytes(&c.to_array());
    }

    fn finish(self) -> TextLayerKey {
        let v = self.inner.digest128();
        TextLayerKey {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_transform(h: &mut StableHasher, t: &Transform) {
    h.write_f64(t.x);
    h.write_f64(t.y);
    h.write_f64(t.scale);
    h.write_f64(t.rotation);
}

fn write_effects(h: &mut StableHasher, fx: &TextEffects) {
    h.write_color(fx.fill_color);

    h.write_bool(fx.outline.enabled);
    h.write_f64(fx.outline.width);
    h.write_color(fx.outline.color);

    h.write_bool(fx.gradient.enabled);
    h.write_u8(match fx.gradient.kind {
        GradientKind::Linear => 0,
        GradientKind::Radial => 1,
    });
    h.write_f64(fx.gradient.angle);
    h.write_u32(fx.gradient.stops.len() as u32);
    for s in &fx.gradient.stops {
        h.write_color(s.color);
        h.write_f64(s.position);
    }

    h.write_bool(fx.pattern.enabled);
    h.write_f64(fx.pattern.scale);
    match &fx.pattern.image {
        Some(img) => {
            h.write_u8(1);
            h.write_u32(img.width);
            h.write_u32(img.height);
            h.write_bytes(&img.data);
        }
        None => h.write_u8(0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/cache_key.rs"]
mod tests;
