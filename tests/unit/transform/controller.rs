use super::*;
use crate::foundation::core::affine_scale_factors;
use crate::render::canvas::recording::RecordingCanvas;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn scale_is_clamped() {
    let mut c = TransformController::new();
    c.set_scale(0.1);
    assert_eq!(c.transform().scale, 0.5);
    c.set_scale(5.0);
    assert_eq!(c.transform().scale, 3.0);
    c.set_scale(1.25);
    assert_eq!(c.transform().scale, 1.25);
}

#[test]
fn rotation_wraps_into_one_turn() {
    let mut c = TransformController::new();
    c.set_rotation(450.0);
    assert!(approx(c.transform().rotation, 90.0));
    c.set_rotation(-90.0);
    assert!(approx(c.transform().rotation, 270.0));
    c.set_rotation(360.0);
    assert_eq!(c.transform().rotation, 0.0);
    c.set_rotation(-1e-20);
    assert!(c.transform().rotation < 360.0);
}

#[test]
fn position_is_clamped_and_nan_is_centered() {
    let mut c = TransformController::new();
    c.set_position(-0.2, 1.7);
    assert_eq!((c.transform().x, c.transform().y), (0.0, 1.0));
    c.set_position(f64::NAN, f64::INFINITY);
    assert_eq!((c.transform().x, c.transform().y), (0.5, 1.0));
    c.set_position(f64::NEG_INFINITY, 0.25);
    assert_eq!((c.transform().x, c.transform().y), (0.0, 0.25));
}

#[test]
fn non_finite_scale_and_rotation_land_in_range() {
    let mut c = TransformController::new();
    c.set_scale(f64::NAN);
    assert_eq!(c.transform().scale, 1.0);
    c.set_scale(f64::INFINITY);
    assert_eq!(c.transform().scale, 3.0);
    c.set_rotation(f64::NAN);
    assert_eq!(c.transform().rotation, 0.0);
}

#[test]
fn from_transform_normalizes() {
    let c = TransformController::from_transform(Transform {
        x: 2.0,
        y: -1.0,
        scale: 9.0,
        rotation: 720.5,
    });
    let t = c.transform();
    assert_eq!((t.x, t.y, t.scale), (1.0, 0.0, 3.0));
    assert!(approx(t.rotation, 0.5));
}

#[test]
fn translation_is_resolution_independent() {
    let mut c = TransformController::new();
    c.set_position(0.25, 0.75);
    for (w, h) in [(100u32, 50u32), (1920, 1080), (3, 7)] {
        let [.., tx, ty] = c.to_affine(w, h).as_coeffs();
        assert!(approx(tx / f64::from(w), 0.25));
        assert!(approx(ty / f64::from(h), 0.75));
    }
}

#[test]
fn scale_factors_match_configured_scale_under_rotation() {
    let mut c = TransformController::new();
    c.set_scale(1.8);
    for deg in [0.0, 33.0, 90.0, 211.0] {
        c.set_rotation(deg);
        let (sx, sy) = affine_scale_factors(c.to_affine(640, 480));
        assert!((sx - 1.8).abs() / 1.8 < 0.02);
        assert!((sy - 1.8).abs() / 1.8 < 0.02);
    }
}

#[test]
fn apply_to_context_composes_onto_existing_transform() {
    let mut canvas = RecordingCanvas::new();
    canvas.begin(200, 100).unwrap();
    canvas.translate(5.0, 5.0);

    let mut c = TransformController::new();
    c.set_position(0.5, 0.5);
    c.set_rotation(90.0);
    c.set_scale(2.0);
    c.apply_to_context(&mut canvas, 200, 100);

    let expected = Affine::translate((5.0, 5.0)) * c.to_affine(200, 100);
    let got = canvas.transform().as_coeffs();
    for (a, b) in got.iter().zip(expected.as_coeffs()) {
        assert!(approx(*a, b));
    }
}

#[test]
fn serde_fills_missing_fields_with_defaults() {
    let t: Transform = serde_json::from_str(r#"{"x":0.1}"#).unwrap();
    assert_eq!(t.x, 0.1);
    assert_eq!((t.y, t.scale, t.rotation), (0.5, 1.0, 0.0));
}
