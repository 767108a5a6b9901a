//! Rigid planar placements.
//!
//! A component's geometry is described in its own untransformed frame:
//! port offsets and beam directions are local vectors. A [`Placement`]
//! carries the component's rotation (about its own position) and the
//! translation to world coordinates, so port positions and ray directions
//! can be resolved without the caller touching trigonometry.

use nalgebra::{Matrix2, Vector2};

/// A rigid 2D placement: rotation about the component origin + translation.
#[derive(Debug, Clone)]
pub struct Placement {
    /// 2x2 rotation matrix.
    pub matrix: Matrix2<f64>,
    /// Translation vector (canvas units).
    pub translation: Vector2<f64>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            matrix: Matrix2::identity(),
            translation: Vector2::zeros(),
        }
    }
}

impl Placement {
    /// Build a placement from a component position and rotation in degrees.
    pub fn new(position: [f64; 2], rotation_deg: f64) -> Self {
        let theta = rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        Self {
            matrix: Matrix2::new(cos, -sin, sin, cos),
            translation: Vector2::new(position[0], position[1]),
        }
    }

    /// Map a local offset (e.g. a port offset) into world coordinates.
    ///
    /// `world = position + R(rotation) · local`
    pub fn world_position(&self, local: [f64; 2]) -> [f64; 2] {
        let v = self.matrix * Vector2::new(local[0], local[1]) + self.translation;
        [v.x, v.y]
    }

    /// Rotate a local direction into world space without translating.
    pub fn world_direction(&self, local: [f64; 2]) -> [f64; 2] {
        let v = self.matrix * Vector2::new(local[0], local[1]);
        [v.x, v.y]
    }
}

/// Rotate a world-space direction by an angle in radians.
pub fn rotate(direction: [f64; 2], angle_rad: f64) -> [f64; 2] {
    let (sin, cos) = angle_rad.sin_cos();
    [
        direction[0] * cos - direction[1] * sin,
        direction[0] * sin + direction[1] * cos,
    ]
}
