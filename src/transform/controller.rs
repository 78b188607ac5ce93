use crate::foundation::core::Affine;
use crate::render::canvas::Canvas;

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.5;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 3.0;

/// Placement of a text layer relative to its surface.
///
/// `x`/`y` are fractions of the surface size, `rotation` is in degrees (clockwise on screen).
/// Values produced by [`TransformController`] or [`Transform::normalized`] are always in range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Horizontal anchor in `[0, 1]`.
    pub x: f64,
    /// Vertical anchor in `[0, 1]`.
    pub y: f64,
    /// Uniform scale in `[0.5, 3.0]`.
    pub scale: f64,
    /// Rotation in `[0, 360)` degrees.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Copy with every field clamped or wrapped into range.
    pub fn normalized(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
            scale: clamp_scale(self.scale),
            rotation: wrap_degrees(self.rotation),
        }
    }

    /// Anchor position in pixels for a `width x height` surface.
    pub fn anchor_px(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }

    /// `translate(anchor) * rotate(rotation) * scale(scale)` for a `width x height` surface.
    pub fn to_affine(&self, width: u32, height: u32) -> Affine {
        let (px, py) = self.anchor_px(width, height);
        Affine::translate((px, py))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(self.scale)
    }
}

/// Owner of a [`Transform`] whose setters silently normalize their input.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformController {
    current: Transform,
}

impl TransformController {
    /// Controller at the surface center, scale 1, no rotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller starting from `initial`, normalized.
    pub fn from_transform(initial: Transform) -> Self {
        Self {
            current: initial.normalized(),
        }
    }

    /// Current placement.
    pub fn transform(&self) -> Transform {
        self.current
    }

    /// Set the anchor; each coordinate is clamped to `[0, 1]` (NaN becomes `0.5`).
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.current.x = clamp_unit(x);
        self.current.y = clamp_unit(y);
    }

    /// Set the scale, clamped to `[0.5, 3.0]`.
    pub fn set_scale(&mut self, scale: f64) {
        self.current.scale = clamp_scale(scale);
    }

    /// Set the rotation in degrees, wrapped into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.current.rotation = wrap_degrees(degrees);
    }

    /// Replace the whole transform, normalizing every field.
    pub fn set(&mut self, transform: Transform) {
        self.current = transform.normalized();
    }

    /// Apply translate, rotate, then scale on top of the canvas's current transform.
    pub fn apply_to_context(&self, canvas: &mut dyn Canvas, width: u32, height: u32) {
        let (px, py) = self.current.anchor_px(width, height);
        canvas.translate(px, py);
        canvas.rotate(self.current.rotation.to_radians());
        canvas.scale(self.current.scale, self.current.scale);
    }

    /// Same matrix as [`TransformController::apply_to_context`] would produce from identity.
    pub fn to_affine(&self, width: u32, height: u32) -> Affine {
        self.current.to_affine(width, height)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.5 } else { v.clamp(0.0, 1.0) }
}

fn clamp_scale(v: f64) -> f64 {
    if v.is_nan() {
        1.0
    } else {
        v.clamp(MIN_SCALE, MAX_SCALE)
    }
}

fn wrap_degrees(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    let r = v.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/controller.rs"]
mod tests;
