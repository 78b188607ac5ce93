use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context as _;

use crate::assets::decode::{decode_image, raster_from_data_url};
use crate::foundation::error::{BoxError, CaptionError, CaptionResult, LoadError};
use crate::render::raster::Raster;

/// Caller-provided byte source (network client, asset bundle, ...).
pub trait ImageFetch: Send + Sync {
    /// Fetch the encoded image bytes.
    fn fetch(&self) -> CaptionResult<Vec<u8>>;
}

impl<F> ImageFetch for F
where
    F: Fn() -> CaptionResult<Vec<u8>> + Send + Sync,
{
    fn fetch(&self) -> CaptionResult<Vec<u8>> {
        self()
    }
}

/// Where an image comes from.
#[derive(Clone)]
pub enum ImageSource {
    /// File on disk.
    Path(PathBuf),
    /// Encoded bytes already in memory.
    Bytes(Arc<[u8]>),
    /// `data:image/...;base64,` URL.
    DataUrl(String),
    /// Custom fetcher.
    Fetch(Arc<dyn ImageFetch>),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::DataUrl(u) => write!(f, "DataUrl({} chars)", u.len()),
            Self::Fetch(_) => f.write_str("Fetch(..)"),
        }
    }
}

impl ImageSource {
    fn read(&self) -> CaptionResult<Raster> {
        let raster = match self {
            Self::Path(p) => {
                let bytes =
                    std::fs::read(p).with_context(|| format!("read image '{}'", p.display()))?;
                decode_image(&bytes)?
            }
            Self::Bytes(b) => decode_image(b)?,
            Self::DataUrl(u) => raster_from_data_url(u)?,
            Self::Fetch(fetch) => decode_image(&fetch.fetch()?)?,
        };
        if raster.is_empty() {
            return Err(CaptionError::validation("image has zero width or height"));
        }
        Ok(raster)
    }
}

/// Retry policy for [`load_image`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Total number of attempts (at least one is always made).
    pub max_retries: u32,
    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Limit per attempt, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_ms: 30_000,
        }
    }
}

/// Load and decode an image, retrying on any failure.
///
/// Each attempt runs on a worker thread and is abandoned once `timeout_ms` passes.
#[tracing::instrument(skip(opts))]
pub fn load_image(source: &ImageSource, opts: &LoadOptions) -> Result<Raster, LoadError> {
    let attempts = opts.max_retries.max(1);
    let mut last: Option<BoxError> = None;
    for attempt in 1..=attempts {
        if attempt > 1 {
            std::thread::sleep(Duration::from_millis(opts.retry_delay_ms));
        }
        match attempt_once(source, opts.timeout_ms) {
            Ok(raster) => {
                tracing::debug!(attempt, size = ?raster.dimensions(), "image loaded");
                return Ok(raster);
            }
            Err(e) => {
                if attempt < attempts {
                    tracing::warn!(attempt, error = %e, "image load failed; retrying");
                }
                last = Some(e);
            }
        }
    }
    Err(LoadError {
        attempts,
        source: last.unwrap_or_else(|| "no attempt made".into()),
    })
}

fn attempt_once(source: &ImageSource, timeout_ms: u64) -> Result<Raster, BoxError> {
    let (tx, rx) = mpsc::channel();
    let source = source.clone();
    std::thread::Builder::new()
        .name("caption-art-load".to_owned())
        .spawn(move || {
            // receiver is gone once the attempt timed out
            let _ = tx.send(source.read());
        })?;
    match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
        Ok(result) => Ok(result?),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(format!("image load timed out after {timeout_ms} ms").into())
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("image load worker panicked".into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
