use glam::{Mat4, Vec3, Vec4};

use super::float::Vec3AsNonZero;

/// An oriented plane `n·p + d = 0` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vec3,
    d: f32,
}

impl Plane {
    /// Builds the plane going through `center` and facing `normal`.
    ///
    /// Returns None when `normal` is (nearly) zero.
    pub fn from_point_normal(center: Vec3, normal: Vec3) -> Option<Self> {
        let normal = normal.into_non_zero(1e-6)?.normalize();
        Some(Self {
            normal,
            d: -normal.dot(center),
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn offset(&self) -> f32 {
        self.d
    }

    /// The coefficients `(a, b, c, d)` of `ax + by + cz + d = 0`.
    pub fn equation(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    pub fn reflection_matrix(&self) -> Mat4 {
        reflection_matrix(self.equation())
    }
}

/// Householder reflection across the plane `ax + by + cz + d = 0`.
///
/// `(a, b, c)` must be unit length. The rows below are stored as columns and the
/// result transposed, so that `M * p` reflects a point expressed as a column vector.
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let [a, b, c, d] = plane.to_array();
    Mat4::from_cols_array_2d(&[
        [1.0 - 2.0 * a * a, -2.0 * a * b, -2.0 * a * c, -2.0 * a * d],
        [-2.0 * a * b, 1.0 - 2.0 * b * b, -2.0 * b * c, -2.0 * b * d],
        [-2.0 * a * c, -2.0 * b * c, 1.0 - 2.0 * c * c, -2.0 * c * d],
        [0.0, 0.0, 0.0, 1.0],
    ])
    .transpose()
}
