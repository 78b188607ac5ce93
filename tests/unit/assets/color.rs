use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));

    let c: Color = serde_json::from_value(json!("#fa0")).unwrap();
    assert_eq!(c, Color::rgb(0xff, 0xaa, 0x00));
}

#[test]
fn parses_css_rgba_strings() {
    assert_eq!(Color::parse("rgb(10, 20, 30)").unwrap(), Color::rgb(10, 20, 30));
    assert_eq!(
        Color::parse("rgba(0,0,0,0.5)").unwrap(),
        Color::rgba(0, 0, 0, 128)
    );
    assert!(Color::parse("rgba(1,2)").is_err());
}

#[test]
fn parses_rgba_object_and_array() {
    let c: Color = serde_json::from_value(json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
    assert_eq!(c, Color::rgb(255, 128, 0));

    let c: Color = serde_json::from_value(json!([0.0, 0.0, 1.0, 0.5])).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));
}

#[test]
fn parses_hsla_object() {
    let c: Color = serde_json::from_value(json!({"h": 0.0, "s": 1.0, "l": 0.5})).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));
}

#[test]
fn rejects_garbage() {
    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#zzzzzz")).is_err());
    assert!(serde_json::from_value::<Color>(json!([1.0])).is_err());
}

#[test]
fn serializes_as_hex_with_alpha() {
    let s = serde_json::to_string(&Color::rgba(1, 2, 3, 4)).unwrap();
    assert_eq!(s, "\"#01020304\"");
    let back: Color = serde_json::from_str(&s).unwrap();
    assert_eq!(back, Color::rgba(1, 2, 3, 4));
}
