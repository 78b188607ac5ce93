//! Layer compositing and the render orchestration built on it.

pub(crate) mod cache_key;
pub(crate) mod compositor;
pub(crate) mod layers;
