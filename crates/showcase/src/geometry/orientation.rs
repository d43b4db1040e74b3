use glam::{Quat, Vec3};

use super::GeometryError;
use crate::{math::Frame, warn_once};

#[derive(Debug, Clone, Copy)]
enum Triangles<'a> {
    U16(&'a [[u16; 3]]),
    U32(&'a [[u32; 3]]),
}

impl Triangles<'_> {
    fn len(&self) -> usize {
        match self {
            Triangles::U16(t) => t.len(),
            Triangles::U32(t) => t.len(),
        }
    }

    fn get(&self, i: usize) -> [u32; 3] {
        match self {
            Triangles::U16(t) => t[i].map(u32::from),
            Triangles::U32(t) => t[i],
        }
    }
}

/// Collects the inputs of a [SurfaceOrientation] solve.
#[derive(Debug, Default)]
pub struct SurfaceOrientationBuilder<'a> {
    vertex_count: Option<usize>,
    positions: Option<&'a [Vec3]>,
    normals: Option<&'a [Vec3]>,
    triangles: Option<Triangles<'a>>,
}

impl<'a> SurfaceOrientationBuilder<'a> {
    pub fn vertex_count(mut self, vertex_count: usize) -> Self {
        self.vertex_count = Some(vertex_count);
        self
    }

    pub fn positions(mut self, positions: &'a [Vec3]) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Per-vertex normals. When given, they are used as is instead of being derived
    /// from the triangles.
    pub fn normals(mut self, normals: &'a [Vec3]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn triangles(mut self, triangles: &'a [[u16; 3]]) -> Self {
        self.triangles = Some(Triangles::U16(triangles));
        self
    }

    pub fn triangles_u32(mut self, triangles: &'a [[u32; 3]]) -> Self {
        self.triangles = Some(Triangles::U32(triangles));
        self
    }

    pub fn build(self) -> Result<SurfaceOrientation, GeometryError> {
        let vertex_count = match (self.vertex_count, self.positions, self.normals) {
            (Some(n), _, _) => n,
            (None, Some(p), _) => p.len(),
            (None, None, Some(n)) => n.len(),
            (None, None, None) => {
                return Err(GeometryError::MissingAttribute {
                    attribute: "positions or normals",
                })
            }
        };

        let normals = match self.normals {
            Some(normals) => {
                check_count("normals", vertex_count, normals.len())?;
                normals.iter().map(|n| n.normalize_or_zero()).collect()
            }
            None => {
                let positions = self.positions.ok_or(GeometryError::MissingAttribute {
                    attribute: "positions",
                })?;
                let triangles = self.triangles.ok_or(GeometryError::MissingAttribute {
                    attribute: "triangles",
                })?;
                check_count("positions", vertex_count, positions.len())?;
                smooth_normals(positions, triangles)?
            }
        };

        let quats = normals
            .iter()
            .map(|&n| {
                if n.length_squared() == 0.0 {
                    warn_once!("vertex without a usable normal, its tangent frame is meaningless");
                }
                Frame::new(n).to_quat()
            })
            .collect();

        Ok(SurfaceOrientation { normals, quats })
    }
}

fn check_count(attribute: &'static str, expected: usize, found: usize) -> Result<(), GeometryError> {
    if expected == found {
        Ok(())
    } else {
        Err(GeometryError::CountMismatch {
            attribute,
            expected,
            found,
        })
    }
}

/// Sums the unnormalized face normals around each vertex, which weights every
/// adjacent face by its area.
fn smooth_normals(positions: &[Vec3], triangles: Triangles) -> Result<Vec<Vec3>, GeometryError> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for t in 0..triangles.len() {
        let tri = triangles.get(t);
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(GeometryError::IndexOutOfRange {
                triangle: t,
                index,
                vertex_count: positions.len(),
            });
        }

        let [a, b, c] = tri.map(|i| positions[i as usize]);
        let face = (b - a).cross(c - a);
        for i in tri {
            normals[i as usize] += face;
        }
    }

    Ok(normals.into_iter().map(Vec3::normalize_or_zero).collect())
}

/// One tangent frame per vertex, encoded as a unit quaternion.
///
/// The rotation's third column is the normal and its second column the tangent,
/// see [crate::math::tangent_frame_axes].
#[derive(Debug, Clone)]
pub struct SurfaceOrientation {
    normals: Vec<Vec3>,
    quats: Vec<Quat>,
}

impl SurfaceOrientation {
    pub fn builder<'a>() -> SurfaceOrientationBuilder<'a> {
        SurfaceOrientationBuilder::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.quats.len()
    }

    pub fn quats(&self) -> &[Quat] {
        &self.quats
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn into_quats(self) -> Vec<Quat> {
        self.quats
    }
}
