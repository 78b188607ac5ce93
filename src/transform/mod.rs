//! Normalized text placement: position, scale and rotation of a text layer.

pub(crate) mod controller;
