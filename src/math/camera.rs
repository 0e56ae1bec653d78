use super::{Vector2, Xform2};

/// A 2D perspective onto the world used for rendering to a viewport.
///
/// `zoom` is world units per camera unit: larger values show more of the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-space point shown at the viewport centre.
    pub position: Vector2,
    /// Positive zoom factor.
    pub zoom: f64,
    /// Rotation in radians.
    pub angle: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector2::ZERO, 1.0)
    }
}

impl Camera {
    /// Unrotated camera at `position`.
    pub fn new(position: Vector2, zoom: f64) -> Self {
        Self {
            position,
            zoom,
            angle: 0.0,
        }
    }

    /// Transform from world coordinates to camera coordinates.
    pub fn xform(&self) -> Xform2 {
        self.inv_xform().inv()
    }

    /// Transform from camera coordinates to world coordinates.
    pub fn inv_xform(&self) -> Xform2 {
        Xform2::new(self.position, self.zoom, self.angle)
    }
}
