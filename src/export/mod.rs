//! Encoding the composited surface to PNG/JPEG files.

pub(crate) mod exporter;
pub(crate) mod filename;
pub(crate) mod sink;
pub(crate) mod watermark;
