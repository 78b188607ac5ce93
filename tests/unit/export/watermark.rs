use super::*;
use crate::render::canvas::recording::{Op, RecordingCanvas};

#[test]
fn font_size_scales_with_width_within_bounds() {
    assert_eq!(watermark_font_size(100), 12.0);
    assert_eq!(watermark_font_size(800), 20.0);
    assert_eq!(watermark_font_size(4000), 24.0);
}

#[test]
fn text_lands_in_the_bottom_right_corner() {
    let surface = Raster::filled(800, 600, [0, 0, 0, 255]);
    let mut canvas = RecordingCanvas::new();
    let out = apply_watermark(&mut canvas, &surface, "caption-art").unwrap();

    let fills = canvas.fills();
    let [Op::Fill { origin, size_px, .. }] = fills.as_slice() else {
        panic!("expected one fill, got {:?}", canvas.ops);
    };
    assert_eq!(*size_px, 20.0);
    // 11 chars * 20px * 0.5em
    assert!((origin.x - (800.0 - 110.0 - 20.0)).abs() < 1e-9);
    assert!((origin.y - 580.0).abs() < 1e-9);

    for y in 0..600 {
        for x in 0..800 {
            if out.pixel(x, y) != Some([0, 0, 0, 255]) {
                assert!(x >= 400 && x < 781 && y >= 300 && y <= 580, "({x},{y})");
            }
        }
    }
    assert_ne!(out.pixel(700, 570), Some([0, 0, 0, 255]));
}

#[test]
fn blank_text_returns_a_plain_copy() {
    let surface = Raster::filled(40, 30, [10, 20, 30, 255]);
    let mut canvas = RecordingCanvas::new();
    let out = apply_watermark(&mut canvas, &surface, "  ").unwrap();
    assert_eq!(out, surface);
    assert!(canvas.fills().is_empty());
}

#[test]
fn drawing_failures_are_tagged() {
    let surface = Raster::filled(40, 30, [10, 20, 30, 255]);
    let mut canvas = RecordingCanvas::new();
    canvas.fail_on_fill = true;
    let err = apply_watermark(&mut canvas, &surface, "x").unwrap_err();
    assert_eq!(err.kind(), crate::foundation::error::ExportErrorKind::WatermarkFailed);

    let mut canvas = RecordingCanvas::new();
    assert!(apply_watermark(&mut canvas, &Raster::new(0, 3), "x").is_err());
}
