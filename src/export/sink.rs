use std::path::{Path, PathBuf};

use crate::foundation::error::{CaptionError, CaptionResult};

/// Destination for encoded files.
pub trait DownloadSink {
    /// Store `bytes` under `filename`.
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> CaptionResult<()>;
}

/// Collects delivered files in memory.
#[derive(Debug, Default)]
pub struct InMemoryDownloads {
    pub(crate) files: Vec<(String, Vec<u8>)>,
}

impl InMemoryDownloads {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered `(filename, bytes)` pairs, oldest first.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    /// Most recent delivery.
    pub fn last(&self) -> Option<&(String, Vec<u8>)> {
        self.files.last()
    }
}

impl DownloadSink for InMemoryDownloads {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> CaptionResult<()> {
        self.files.push((filename.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

/// Writes delivered files into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir` (created on first delivery).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, filename: &str, bytes: &[u8]) -> CaptionResult<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(CaptionError::validation(format!(
                "refusing to write suspicious file name '{filename}'"
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            CaptionError::render(format!("create '{}': {e}", self.dir.display()))
        })?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)
            .map_err(|e| CaptionError::render(format!("write '{}': {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
