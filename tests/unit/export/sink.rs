use super::*;

#[test]
fn in_memory_keeps_order() {
    let mut s = InMemoryDownloads::new();
    s.deliver("a.png", &[1]).unwrap();
    s.deliver("b.png", &[2, 3]).unwrap();
    assert_eq!(s.files().len(), 2);
    assert_eq!(s.last().unwrap().0, "b.png");
}

#[test]
fn directory_sink_writes_files() {
    let dir = std::env::temp_dir().join(format!("caption-art-sink-{}", std::process::id()));
    let mut s = DirectorySink::new(&dir);
    s.deliver("out.png", b"png").unwrap();
    assert_eq!(std::fs::read(dir.join("out.png")).unwrap(), b"png");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn directory_sink_rejects_paths() {
    let mut s = DirectorySink::new(std::env::temp_dir());
    assert!(s.deliver("../escape.png", b"x").is_err());
    assert!(s.deliver("", b"x").is_err());
    assert!(s.deliver(".hidden", b"x").is_err());
}
