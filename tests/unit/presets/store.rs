use std::sync::Arc;

use super::*;
use crate::assets::color::Color;
use crate::render::raster::Raster;

fn fancy() -> TextEffects {
    let mut e = TextEffects::default();
    e.fill_color = Color::rgb(10, 20, 30);
    e.outline.enabled = true;
    e.outline.width = 4.0;
    e.pattern.enabled = true;
    e.pattern.scale = 0.5;
    e.pattern.image = Some(Arc::new(Raster::filled(2, 2, [0, 128, 0, 255])));
    e
}

fn temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "caption-art-presets-{tag}-{}.json",
        std::process::id()
    ))
}

fn exercise(store: &mut dyn PresetStore) {
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.load("missing").unwrap(), None);

    store.save("zeta", &TextEffects::default()).unwrap();
    store.save(" alpha ", &fancy()).unwrap();
    assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    assert_eq!(store.load("alpha").unwrap(), Some(fancy()));

    store.save("alpha", &TextEffects::default()).unwrap();
    assert_eq!(store.load("alpha").unwrap(), Some(TextEffects::default()));

    assert!(store.delete("zeta").unwrap());
    assert!(!store.delete("zeta").unwrap());
    assert_eq!(store.list().unwrap(), vec!["alpha"]);

    assert!(store.save("  ", &fancy()).is_err());
}

#[test]
fn memory_store_contract() {
    exercise(&mut MemoryPresetStore::new());
}

#[test]
fn json_file_store_contract() {
    let path = temp_file("contract");
    let _ = std::fs::remove_file(&path);
    exercise(&mut JsonFilePresetStore::new(&path));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn json_file_is_shared_and_keeps_patterns() {
    let path = temp_file("shared");
    let mut a = JsonFilePresetStore::new(&path);
    a.save("look", &fancy()).unwrap();

    let b = JsonFilePresetStore::new(&path);
    let loaded = b.load("look").unwrap().unwrap();
    assert_eq!(loaded.pattern.image.as_deref(), fancy().pattern.image.as_deref());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("data:image/png;base64,"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn json_file_rejects_unknown_versions() {
    let path = temp_file("version");
    std::fs::write(&path, r#"{"version":9,"presets":{}}"#).unwrap();
    assert!(JsonFilePresetStore::new(&path).list().is_err());
    let _ = std::fs::remove_file(&path);
}
