use std::hash::{Hash, Hasher};

use crate::assets::color::Color;
use crate::foundation::error::CaptionError;
use crate::render::canvas::{FontSpec, Shadow, StrokeStyle};

/// Built-in text styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StylePreset {
    /// White text with a layered magenta glow.
    Neon,
    /// Bold serif with a dark outline and drop shadow.
    Magazine,
    /// Italic script in gold with a brown outline.
    Brush,
    /// Heavy grey face with a hard offset shadow.
    Emboss,
}

impl StylePreset {
    /// Every preset, in declaration order.
    pub const ALL: [StylePreset; 4] = [Self::Neon, Self::Magazine, Self::Brush, Self::Emboss];

    /// Lowercase identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Neon => "neon",
            Self::Magazine => "magazine",
            Self::Brush => "brush",
            Self::Emboss => "emboss",
        }
    }

    /// Style recipe at `font_size` pixels.
    pub fn descriptor(self, font_size: f32) -> StyleDescriptor {
        let size = font_size.max(1.0);
        match self {
            Self::Neon => {
                let glow = Color::rgb(0xff, 0x00, 0xde);
                StyleDescriptor {
                    font: FontSpec::new("Arial, Helvetica, sans-serif", size).bold(),
                    fill: Color::WHITE,
                    stroke: None,
                    shadow: None,
                    shadow_layers: [10.0, 20.0, 30.0, 40.0]
                        .into_iter()
                        .map(|blur| Shadow {
                            color: glow,
                            blur,
                            offset_x: 0.0,
                            offset_y: 0.0,
                        })
                        .collect(),
                }
            }
            Self::Magazine => StyleDescriptor {
                font: FontSpec::new("Georgia, 'Times New Roman', serif", size).bold(),
                fill: Color::WHITE,
                stroke: Some(StrokeStyle {
                    color: Color::BLACK,
                    width: f64::from((size / 16.0).max(2.0)),
                }),
                shadow: Some(Shadow {
                    color: Color::rgba(0, 0, 0, 128),
                    blur: 8.0,
                    offset_x: 4.0,
                    offset_y: 4.0,
                }),
                shadow_layers: Vec::new(),
            },
            Self::Brush => StyleDescriptor {
                font: FontSpec::new("'Brush Script MT', cursive", size)
                    .bold()
                    .italic(),
                fill: Color::rgb(0xff, 0xd7, 0x00),
                stroke: Some(StrokeStyle {
                    color: Color::rgb(0x8b, 0x45, 0x13),
                    width: 2.0,
                }),
                shadow: Some(Shadow {
                    color: Color::rgba(0, 0, 0, 77),
                    blur: 4.0,
                    offset_x: 2.0,
                    offset_y: 2.0,
                }),
                shadow_layers: Vec::new(),
            },
            Self::Emboss => StyleDescriptor {
                font: FontSpec::new("Impact, 'Arial Black', sans-serif", size).bold(),
                fill: Color::rgb(0xcc, 0xcc, 0xcc),
                stroke: Some(StrokeStyle {
                    color: Color::rgb(0x66, 0x66, 0x66),
                    width: 1.0,
                }),
                shadow: Some(Shadow {
                    color: Color::rgba(0, 0, 0, 153),
                    blur: 2.0,
                    offset_x: 3.0,
                    offset_y: 3.0,
                }),
                shadow_layers: Vec::new(),
            },
        }
    }
}

impl std::fmt::Display for StylePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for StylePreset {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                CaptionError::validation(format!(
                    "unknown style preset '{s}' (expected neon, magazine, brush or emboss)"
                ))
            })
    }
}

impl serde::Serialize for StylePreset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> serde::Deserialize<'de> for StylePreset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Declarative drawing recipe produced by a [`StylePreset`].
#[derive(Clone, Debug, PartialEq)]
pub struct StyleDescriptor {
    /// Font to draw with.
    pub font: FontSpec,
    /// Solid fill color.
    pub fill: Color,
    /// Outline drawn before the fill.
    pub stroke: Option<StrokeStyle>,
    /// Shadow attached to the final fill.
    pub shadow: Option<Shadow>,
    /// Glow passes, each a fill with its own shadow, drawn first and in order.
    pub shadow_layers: Vec<Shadow>,
}

// Floats are hashed by bit pattern; presets never produce NaN.
impl Eq for StyleDescriptor {}

impl Hash for StyleDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn shadow<H: Hasher>(s: &Shadow, state: &mut H) {
            s.color.hash(state);
            s.blur.to_bits().hash(state);
            s.offset_x.to_bits().hash(state);
            s.offset_y.to_bits().hash(state);
        }

        self.font.family.hash(state);
        self.font.size_px.to_bits().hash(state);
        self.font.weight.hash(state);
        self.font.italic.hash(state);
        self.fill.hash(state);
        match &self.stroke {
            Some(s) => {
                1u8.hash(state);
                s.color.hash(state);
                s.width.to_bits().hash(state);
            }
            None => 0u8.hash(state),
        }
        match &self.shadow {
            Some(s) => {
                1u8.hash(state);
                shadow(s, state);
            }
            None => 0u8.hash(state),
        }
        self.shadow_layers.len().hash(state);
        for s in &self.shadow_layers {
            shadow(s, state);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/presets.rs"]
mod tests;
