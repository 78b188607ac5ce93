//! Named [`crate::TextEffects`] presets.

pub(crate) mod store;
