pub use kurbo::{Affine, Point, Rect, Vec2};

/// Convert a crate-level affine into the matrix type used by `vello_cpu`.
pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// Horizontal and vertical scale factors encoded in an affine matrix.
///
/// For a matrix built from rotation and uniform scaling both factors equal the scale.
pub fn affine_scale_factors(a: Affine) -> (f64, f64) {
    let [a, b, c, d, _, _] = a.as_coeffs();
    ((a * a + b * b).sqrt(), (c * c + d * d).sqrt())
}
