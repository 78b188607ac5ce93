//! Text styling: built-in presets, effect descriptions, multi-line layout and the drawing of
//! text layers onto a [`crate::Canvas`].

pub(crate) mod effects;
pub(crate) mod layout;
pub(crate) mod presets;
pub(crate) mod text;
