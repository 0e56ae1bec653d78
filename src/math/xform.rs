use super::{Vector2, rotate};

/// Affine 2D transform: uniform scale, then rotation, then offset.
///
/// Represents `p' = offset + scale * rotate(p, angle)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Xform2 {
    /// Translation applied last.
    pub offset: Vector2,
    /// Uniform scale factor; must be positive.
    pub scale: f64,
    /// Rotation in radians.
    pub angle: f64,
}

impl Default for Xform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Xform2 {
    /// The transform that maps every point onto itself.
    pub const IDENTITY: Self = Self {
        offset: Vector2::ZERO,
        scale: 1.0,
        angle: 0.0,
    };

    /// Builds a transform from its three components.
    pub fn new(offset: Vector2, scale: f64, angle: f64) -> Self {
        Self {
            offset,
            scale,
            angle,
        }
    }

    /// Transforms a point.
    ///
    /// # Examples
    /// ```
    /// # use hex_paint::math::{Vector2, Xform2};
    /// let xf = Xform2::new(Vector2::new(100.0, 50.0), 2.0, 0.0);
    /// assert_eq!(xf.apply(Vector2::new(1.0, 1.0)), Vector2::new(102.0, 52.0));
    /// ```
    pub fn apply(&self, v: Vector2) -> Vector2 {
        self.offset + rotate(v, self.angle) * self.scale
    }

    /// Composition: the returned transform applies `other` first, then `self`.
    ///
    /// Also available as `self * other`.
    pub fn compose(&self, other: &Xform2) -> Xform2 {
        Xform2 {
            offset: self.apply(other.offset),
            scale: self.scale * other.scale,
            angle: self.angle + other.angle,
        }
    }

    /// Exact algebraic inverse.
    pub fn inv(&self) -> Xform2 {
        let offset = rotate(-self.offset, -self.angle) * (1.0 / self.scale);
        Xform2 {
            offset,
            scale: 1.0 / self.scale,
            angle: -self.angle,
        }
    }

    /// Component-wise comparison with `tolerance`; angles are compared modulo a full turn.
    pub fn approx_eq(&self, other: &Xform2, tolerance: f64) -> bool {
        (self.offset - other.offset).length() <= tolerance
            && super::approx_eq(self.scale, other.scale, tolerance)
            && super::normalize_angle(self.angle - other.angle).abs() <= tolerance
    }
}

impl std::ops::Mul for Xform2 {
    type Output = Xform2;

    fn mul(self, rhs: Xform2) -> Xform2 {
        self.compose(&rhs)
    }
}
