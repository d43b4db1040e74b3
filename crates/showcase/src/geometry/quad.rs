use glam::{Vec2, Vec3};

use super::{GeometryError, UvVertex};
use crate::math::{float::Vec3AsNonZero, Plane};

/// A square facing `normal`, the surface of a planar mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorQuad {
    center: Vec3,
    plane: Plane,
    u: Vec3,
    v: Vec3,
}

impl MirrorQuad {
    pub const INDICES: [u16; 6] = [0, 1, 2, 3, 2, 1];

    /// The quad's edges are aligned with `facing × +Y` and `facing × (facing × +Y)`,
    /// which keeps the mirror upright. `facing` must not be vertical.
    pub fn new(center: Vec3, facing: Vec3, half_extent: f32) -> Result<Self, GeometryError> {
        let degenerate = || GeometryError::DegenerateQuad { normal: facing };
        let plane = Plane::from_point_normal(center, facing).ok_or_else(degenerate)?;
        let normal = plane.normal();
        let u = normal.cross(Vec3::Y).into_non_zero(1e-6).ok_or_else(degenerate)?.normalize();
        let v = normal.cross(u);

        Ok(Self {
            center,
            plane,
            u: half_extent * u,
            v: half_extent * v,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn normal(&self) -> Vec3 {
        self.plane.normal()
    }

    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn vertices(&self) -> [UvVertex; 4] {
        let Self { center: c, u, v, .. } = *self;
        [
            UvVertex::new(c - u - v, Vec2::new(1.0, 0.0)),
            UvVertex::new(c + u - v, Vec2::new(0.0, 0.0)),
            UvVertex::new(c - u + v, Vec2::new(1.0, 1.0)),
            UvVertex::new(c + u + v, Vec2::new(0.0, 1.0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_lie_on_the_mirror_plane() {
        let quad = MirrorQuad::new(Vec3::new(-2.0, 0.0, -5.0), Vec3::new(1.0, 0.0, 2.0), 1.5).unwrap();
        let plane = quad.plane();
        for vertex in quad.vertices() {
            let p = Vec3::from_array(vertex.position);
            assert!(plane.signed_distance(p).abs() < 1e-5);
            // corners sit at 1.5 * sqrt(2) from the center
            assert!(((p - quad.center()).length() - 1.5 * 2f32.sqrt()).abs() < 1e-5);
        }
    }

    #[test]
    fn edges_follow_horizontal_and_vertical_axes() {
        let quad = MirrorQuad::new(Vec3::ZERO, Vec3::Z, 1.0).unwrap();
        let [a, b, c, d] = quad.vertices().map(|v| Vec3::from_array(v.position));
        assert!((b - a).abs_diff_eq(Vec3::new(-2.0, 0.0, 0.0), 1e-6));
        assert!((c - a).abs_diff_eq(Vec3::new(0.0, -2.0, 0.0), 1e-6));
        assert!((d - a).abs_diff_eq(Vec3::new(-2.0, -2.0, 0.0), 1e-6));
        assert_eq!(MirrorQuad::INDICES, [0, 1, 2, 3, 2, 1]);
    }

    #[test]
    fn vertical_normal_is_rejected() {
        assert!(MirrorQuad::new(Vec3::ZERO, Vec3::Y, 1.0).is_err());
        assert!(MirrorQuad::new(Vec3::ZERO, Vec3::ZERO, 1.0).is_err());
    }
}
