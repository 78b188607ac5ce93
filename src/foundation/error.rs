/// Crate-wide result alias.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Boxed error used as the attached cause of stage-specific failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for the compositing engine.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// Invalid caller input (construction-time problems, malformed rasters, bad options).
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while drawing a layer.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Export pipeline failure.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Image loading failure after all retries.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CaptionError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CaptionError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

/// Stage at which an export failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportErrorKind {
    /// The surface has no pixels.
    InvalidSurface,
    /// Both encoding tiers failed to produce bytes.
    EncodeFailed,
    /// Encoded bytes could not be delivered.
    DownloadFailed,
    /// Watermark drawing failed.
    WatermarkFailed,
}

/// Export failure, tagged by stage.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Surface with zero width or height.
    #[error("export error: invalid surface {width}x{height}")]
    InvalidSurface {
        /// Surface width.
        width: u32,
        /// Surface height.
        height: u32,
    },

    /// Encoding failed in every tier.
    #[error("export error: encode failed: {source}")]
    EncodeFailed {
        /// Last underlying encoder failure.
        #[source]
        source: BoxError,
    },

    /// Delivery of the encoded file failed.
    #[error("export error: download of '{filename}' failed: {source}")]
    DownloadFailed {
        /// File name that was being delivered.
        filename: String,
        /// Underlying sink failure.
        #[source]
        source: BoxError,
    },

    /// Watermark could not be drawn. Absorbed by [`crate::Exporter::export`]; surfaced only by
    /// [`crate::apply_watermark`].
    #[error("export error: watermark failed: {source}")]
    WatermarkFailed {
        /// Underlying drawing failure.
        #[source]
        source: BoxError,
    },
}

impl ExportError {
    /// Stage tag of this error.
    pub fn kind(&self) -> ExportErrorKind {
        match self {
            Self::InvalidSurface { .. } => ExportErrorKind::InvalidSurface,
            Self::EncodeFailed { .. } => ExportErrorKind::EncodeFailed,
            Self::DownloadFailed { .. } => ExportErrorKind::DownloadFailed,
            Self::WatermarkFailed { .. } => ExportErrorKind::WatermarkFailed,
        }
    }
}

/// Image loading failure with retry metadata.
#[derive(thiserror::Error, Debug)]
#[error("load error: giving up after {attempts} attempt(s): {source}")]
pub struct LoadError {
    /// Number of attempts made.
    pub attempts: u32,
    /// Cause of the last failed attempt.
    #[source]
    pub source: BoxError,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
