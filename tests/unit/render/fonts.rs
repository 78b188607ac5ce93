use super::*;

const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn book_with_system_font() -> Option<FontBook> {
    let bytes = std::fs::read(DEJAVU).ok()?;
    let mut book = FontBook::new();
    book.register(bytes).ok()?;
    Some(book)
}

#[test]
fn empty_book_cannot_resolve() {
    let book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.resolve("Impact, sans-serif").is_err());
}

#[test]
fn garbage_bytes_are_rejected() {
    let mut book = FontBook::new();
    assert!(book.register(vec![0u8; 64]).is_err());
    assert!(book.is_empty());
}

#[test]
fn alias_requires_registered_family() {
    let mut book = FontBook::new();
    assert!(book.alias("Impact", "DejaVu Sans").is_err());
}

#[test]
fn stack_falls_back_to_first_registered_family() {
    let Some(book) = book_with_system_font() else {
        return;
    };
    assert_eq!(book.resolve("Impact, sans-serif").unwrap(), "DejaVu Sans");
    assert_eq!(book.resolve("'dejavu sans'").unwrap(), "DejaVu Sans");
}

#[test]
fn alias_redirects_stack_entry() {
    let Some(mut book) = book_with_system_font() else {
        return;
    };
    book.alias("Georgia", "DejaVu Sans").unwrap();
    assert_eq!(book.resolve("Georgia, serif").unwrap(), "DejaVu Sans");
}

#[test]
fn shaping_is_cached_and_grows_with_text() {
    let Some(mut book) = book_with_system_font() else {
        return;
    };
    let font = FontSpec::new("DejaVu Sans", 32.0);
    let short = book.shape("Hi", &font).unwrap();
    let long = book.shape("Hi there", &font).unwrap();
    assert!(long.width > short.width);
    assert!(short.baseline > 0.0 && short.baseline < short.height);

    let again = book.shape("Hi", &font).unwrap();
    assert!(Arc::ptr_eq(&short, &again));
}

#[test]
fn shaping_rejects_bad_size() {
    let Some(mut book) = book_with_system_font() else {
        return;
    };
    assert!(book.shape("x", &FontSpec::new("DejaVu Sans", 0.0)).is_err());
}
