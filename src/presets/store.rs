use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::effects::TextEffects;

const PRESET_FILE_VERSION: u32 = 1;

/// Named storage for effect presets.
pub trait PresetStore {
    /// Store `effects` under `name`, replacing any previous preset with that name.
    fn save(&mut self, name: &str, effects: &TextEffects) -> CaptionResult<()>;

    /// Preset stored under `name`, if any.
    fn load(&self, name: &str) -> CaptionResult<Option<TextEffects>>;

    /// Stored preset names, sorted.
    fn list(&self) -> CaptionResult<Vec<String>>;

    /// Remove `name`; returns whether it existed.
    fn delete(&mut self, name: &str) -> CaptionResult<bool>;
}

fn preset_name(name: &str) -> CaptionResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CaptionError::validation("preset name must not be empty"));
    }
    Ok(name)
}

/// Presets kept in memory for the lifetime of the store.
#[derive(Clone, Debug, Default)]
pub struct MemoryPresetStore {
    presets: BTreeMap<String, TextEffects>,
}

impl MemoryPresetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for MemoryPresetStore {
    fn save(&mut self, name: &str, effects: &TextEffects) -> CaptionResult<()> {
        self.presets
            .insert(preset_name(name)?.to_owned(), effects.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> CaptionResult<Option<TextEffects>> {
        Ok(self.presets.get(preset_name(name)?).cloned())
    }

    fn list(&self) -> CaptionResult<Vec<String>> {
        Ok(self.presets.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> CaptionResult<bool> {
        Ok(self.presets.remove(preset_name(name)?).is_some())
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PresetFile {
    version: u32,
    #[serde(default)]
    presets: BTreeMap<String, TextEffects>,
}

/// Presets persisted as one JSON document; pattern images are stored as PNG data URLs.
///
/// Every operation re-reads the file, so several stores may point at the same path. A missing
/// file reads as an empty store.
#[derive(Clone, Debug)]
pub struct JsonFilePresetStore {
    path: PathBuf,
}

impl JsonFilePresetStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> CaptionResult<BTreeMap<String, TextEffects>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read presets '{}'", self.path.display()))
                    .into());
            }
        };
        let file: PresetFile = serde_json::from_str(&text)?;
        if file.version != PRESET_FILE_VERSION {
            return Err(CaptionError::validation(format!(
                "unsupported preset file version {} (expected {PRESET_FILE_VERSION})",
                file.version
            )));
        }
        Ok(file.presets)
    }

    fn write(&self, presets: BTreeMap<String, TextEffects>) -> CaptionResult<()> {
        let file = PresetFile {
            version: PRESET_FILE_VERSION,
            presets,
        };
        let json = serde_json::to_string_pretty(&file)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create '{}'", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace '{}'", self.path.display()))?;
        Ok(())
    }
}

impl PresetStore for JsonFilePresetStore {
    fn save(&mut self, name: &str, effects: &TextEffects) -> CaptionResult<()> {
        let name = preset_name(name)?;
        let mut presets = self.read()?;
        presets.insert(name.to_owned(), effects.clone());
        self.write(presets)?;
        tracing::debug!(name, path = %self.path.display(), "preset saved");
        Ok(())
    }

    fn load(&self, name: &str) -> CaptionResult<Option<TextEffects>> {
        let name = preset_name(name)?;
        Ok(self.read()?.remove(name))
    }

    fn list(&self) -> CaptionResult<Vec<String>> {
        Ok(self.read()?.into_keys().collect())
    }

    fn delete(&mut self, name: &str) -> CaptionResult<bool> {
        let name = preset_name(name)?;
        let mut presets = self.read()?;
        let existed = presets.remove(name).is_some();
        if existed {
            self.write(presets)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/presets/store.rs"]
mod tests;
