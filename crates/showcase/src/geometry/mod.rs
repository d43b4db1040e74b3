//! Procedural geometry and per-vertex data fed to the engine's buffers.

pub mod icosphere;
pub mod orientation;
pub mod quad;
pub mod vertex;

pub use icosphere::IcoSphere;
pub use orientation::{SurfaceOrientation, SurfaceOrientationBuilder};
pub use quad::MirrorQuad;
pub use vertex::{MeshVertex, TangentVertex, UvVertex};

use glam::Vec3;

#[derive(Debug, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GeometryError {
    #[display("icosphere level {subdivisions} needs {vertices} vertices, 16-bit indices address at most 65536")]
    TooManyVertices { subdivisions: u8, vertices: usize },
    #[display("missing {attribute}")]
    MissingAttribute { attribute: &'static str },
    #[display("{attribute}: expected {expected} elements, got {found}")]
    CountMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("triangle {triangle} references vertex {index} but there are only {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
    #[display("a quad facing {normal} has no well defined up direction")]
    DegenerateQuad { normal: Vec3 },
}

/// Axis aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const UNIT: Self = Self {
        min: Vec3::NEG_ONE,
        max: Vec3::ONE,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn splat(half_extent: f32) -> Self {
        Self::new(Vec3::splat(-half_extent), Vec3::splat(half_extent))
    }

    /// Smallest box containing every point, None for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self::new(p, p)),
            Some(b) => Some(Self::new(b.min.min(p), b.max.max(p))),
        })
    }

    pub fn center(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    pub fn half_extent(&self) -> Vec3 {
        0.5 * (self.max - self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_points() {
        assert_eq!(Aabb::from_points([]), None);
        let b = Aabb::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 2.0)]).unwrap();
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(b.center(), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(b.half_extent(), Vec3::new(1.0, 3.0, 1.0));
    }
}
