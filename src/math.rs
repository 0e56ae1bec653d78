//! 2D vector, transform, colour and camera math.
//!
//! No ECS types in here: world, camera and canvas spaces are all plain
//! [`Vector2`] values related by [`Xform2`] transforms.

pub mod camera;
pub mod color;
pub mod xform;

pub use camera::Camera;
pub use color::{Hsv, Rgb};
pub use xform::Xform2;

/// Double-precision 2D point / vector used for all world, camera and canvas math.
///
/// Negation, addition, subtraction, scalar multiplication and `dot` come from
/// glam; rotation by an angle is [`rotate`].
pub type Vector2 = bevy::math::DVec2;

/// Tolerance used when comparing transformed coordinates.
pub const EPSILON: f64 = 1e-9;

/// Rotates `v` counter-clockwise by `angle` radians about the origin.
///
/// # Examples
/// ```
/// # use hex_paint::math::{rotate, Vector2};
/// let v = rotate(Vector2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
/// assert!(v.x.abs() < 1e-12);
/// assert!((v.y - 1.0).abs() < 1e-12);
/// ```
pub fn rotate(v: Vector2, angle: f64) -> Vector2 {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// `true` when `a` and `b` differ by at most `tolerance`.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Wraps an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}
