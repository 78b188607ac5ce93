use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::canvas::FontSpec;

const SHAPE_CACHE_CAP: usize = 256;

/// Generic CSS family keywords. They never match a registered family and fall through to the
/// next entry of the stack.
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
];

struct Face {
    family: String,
    blob_id: u64,
    data: vello_cpu::peniko::FontData,
}

/// Glyphs of one shaped line, positioned relative to the line box's top-left corner.
#[derive(Clone, Debug)]
pub(crate) struct ShapedLine {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) baseline: f64,
    pub(crate) runs: Vec<ShapedRun>,
}

#[derive(Clone, Debug)]
pub(crate) struct ShapedRun {
    pub(crate) face: usize,
    pub(crate) font_size: f32,
    /// `(glyph id, x, y)` with `y` on the baseline.
    pub(crate) glyphs: Vec<(u32, f32, f32)>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ShapeKey {
    text: String,
    family: String,
    size_bits: u32,
    weight: u16,
    italic: bool,
}

/// Registered fonts plus the parley contexts used to shape text with them.
///
/// Family stacks are resolved against registered family names and aliases (case-insensitive);
/// when nothing in the stack matches, the first registered family is used.
pub struct FontBook {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: Vec<Face>,
    aliases: HashMap<String, String>,
    shaped: HashMap<ShapeKey, Arc<ShapedLine>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families())
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// Empty font book.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            aliases: HashMap::new(),
            shaped: HashMap::new(),
        }
    }

    /// Register a TrueType/OpenType font; returns its family name.
    pub fn register(&mut self, font_bytes: Vec<u8>) -> CaptionResult<String> {
        let blob = parley::fontique::Blob::from(font_bytes.clone());
        let blob_id = blob.id();
        let families = self.font_ctx.collection.register_fonts(blob, None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CaptionError::validation("no font families registered from font bytes")
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::validation("registered font family has no name"))?
            .to_string();

        self.faces.push(Face {
            family: family.clone(),
            blob_id,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        });
        self.shaped.clear();
        tracing::debug!(family = %family, "registered font");
        Ok(family)
    }

    /// Read and register a font file.
    pub fn register_file(&mut self, path: impl AsRef<std::path::Path>) -> CaptionResult<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            CaptionError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        self.register(bytes)
    }

    /// Make `alias` resolve to the registered `family` (e.g. `"Impact"` to a stand-in face).
    pub fn alias(&mut self, alias: &str, family: &str) -> CaptionResult<()> {
        if !self.faces.iter().any(|f| f.family.eq_ignore_ascii_case(family)) {
            return Err(CaptionError::validation(format!(
                "cannot alias '{alias}': family '{family}' is not registered"
            )));
        }
        self.aliases
            .insert(alias.trim().to_ascii_lowercase(), family.to_owned());
        self.shaped.clear();
        Ok(())
    }

    /// Registered family names, in registration order, without duplicates.
    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for face in &self.faces {
            if !out.contains(&face.family.as_str()) {
                out.push(&face.family);
            }
        }
        out
    }

    /// `true` when no font has been registered.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Registered family chosen for a CSS-like family stack.
    pub fn resolve(&self, stack: &str) -> CaptionResult<&str> {
        for entry in stack.split(',') {
            let name = entry.trim().trim_matches(|c| c == '"' || c == '\'').trim();
            if name.is_empty() {
                continue;
            }
            let lower = name.to_ascii_lowercase();
            if GENERIC_FAMILIES.contains(&lower.as_str()) {
                continue;
            }
            if let Some(target) = self.aliases.get(&lower) {
                if let Some(face) = self.faces.iter().find(|f| f.family == *target) {
                    return Ok(&face.family);
                }
            }
            if let Some(face) = self
                .faces
                .iter()
                .find(|f| f.family.eq_ignore_ascii_case(name))
            {
                return Ok(&face.family);
            }
        }
        self.faces
            .first()
            .map(|f| f.family.as_str())
            .ok_or_else(|| CaptionError::validation("no fonts registered"))
    }

    pub(crate) fn face_data(&self, face: usize) -> Option<&vello_cpu::peniko::FontData> {
        self.faces.get(face).map(|f| &f.data)
    }

    /// Shape one line of text (no wrapping).
    pub(crate) fn shape(&mut self, text: &str, font: &FontSpec) -> CaptionResult<Arc<ShapedLine>> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(CaptionError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        let family = self.resolve(&font.family)?.to_owned();
        let key = ShapeKey {
            text: text.to_owned(),
            family: family.clone(),
            size_bits: font.size_px.to_bits(),
            weight: font.weight,
            italic: font.italic,
        };
        if let Some(hit) = self.shaped.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let fallback_face = self
            .faces
            .iter()
            .position(|f| f.family == family)
            .unwrap_or(0);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Single(parley::style::FontFamily::Named(Cow::Owned(
                family,
            ))),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(font.weight)),
        ));
        if font.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut line_out = ShapedLine {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            baseline: 0.0,
            runs: Vec::new(),
        };
        for (i, line) in layout.lines().enumerate() {
            if i == 0 {
                line_out.baseline = f64::from(line.metrics().baseline);
            }
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let run = glyph_run.run();
                let blob_id = run.font().data.id();
                let face = self
                    .faces
                    .iter()
                    .position(|f| f.blob_id == blob_id)
                    .unwrap_or(fallback_face);

                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let glyphs = glyph_run
                    .glyphs()
                    .map(|g| {
                        let out = (g.id, x + g.x, y - g.y);
                        x += g.advance;
                        out
                    })
                    .collect();
                line_out.runs.push(ShapedRun {
                    face,
                    font_size: run.font_size(),
                    glyphs,
                });
            }
        }

        if self.shaped.len() >= SHAPE_CACHE_CAP {
            self.shaped.clear();
        }
        let out = Arc::new(line_out);
        self.shaped.insert(key, Arc::clone(&out));
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fonts.rs"]
mod tests;
