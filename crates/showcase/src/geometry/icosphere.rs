use std::collections::HashMap;

use glam::Vec3;

use super::GeometryError;

const X: f32 = 0.525_731_1;
const Z: f32 = 0.850_650_8;

/// Regular icosahedron inscribed in the unit sphere.
const VERTICES: [Vec3; 12] = [
    Vec3::new(-X, 0.0, Z),
    Vec3::new(X, 0.0, Z),
    Vec3::new(-X, 0.0, -Z),
    Vec3::new(X, 0.0, -Z),
    Vec3::new(0.0, Z, X),
    Vec3::new(0.0, Z, -X),
    Vec3::new(0.0, -Z, X),
    Vec3::new(0.0, -Z, -X),
    Vec3::new(Z, X, 0.0),
    Vec3::new(-Z, X, 0.0),
    Vec3::new(Z, -X, 0.0),
    Vec3::new(-Z, -X, 0.0),
];

const TRIANGLES: [[u16; 3]; 20] = [
    [1, 4, 0],
    [4, 9, 0],
    [4, 5, 9],
    [8, 5, 4],
    [1, 8, 4],
    [1, 10, 8],
    [10, 3, 8],
    [8, 3, 5],
    [3, 2, 5],
    [3, 7, 2],
    [3, 10, 7],
    [10, 6, 7],
    [6, 11, 7],
    [6, 0, 11],
    [6, 1, 0],
    [10, 1, 6],
    [11, 0, 9],
    [2, 11, 9],
    [5, 2, 9],
    [11, 2, 7],
];

/// Unit sphere built by recursively splitting the faces of an icosahedron.
///
/// Edge midpoints are shared between neighbouring triangles, so level `s` has exactly
/// `10·4^s + 2` vertices and `20·4^s` triangles.
#[derive(Debug, Clone)]
pub struct IcoSphere {
    vertices: Vec<Vec3>,
    indices: Vec<[u16; 3]>,
}

impl IcoSphere {
    pub fn new(subdivisions: u8) -> Result<Self, GeometryError> {
        let vertex_count = Self::vertex_count_for(subdivisions);
        if vertex_count > u16::MAX as usize + 1 {
            return Err(GeometryError::TooManyVertices {
                subdivisions,
                vertices: vertex_count,
            });
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        vertices.extend_from_slice(&VERTICES);
        let mut indices = TRIANGLES.to_vec();
        for _ in 0..subdivisions {
            indices = subdivide(&mut vertices, &indices);
        }

        log::debug!(
            "icosphere level {subdivisions}: {} vertices, {} triangles",
            vertices.len(),
            indices.len()
        );
        Ok(Self { vertices, indices })
    }

    pub fn vertex_count_for(subdivisions: u8) -> usize {
        4usize
            .checked_pow(subdivisions as u32)
            .and_then(|p| p.checked_mul(10))
            .map_or(usize::MAX, |v| v + 2)
    }

    pub fn triangle_count_for(subdivisions: u8) -> usize {
        4usize
            .checked_pow(subdivisions as u32)
            .and_then(|p| p.checked_mul(20))
            .unwrap_or(usize::MAX)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u16; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn index_count(&self) -> usize {
        3 * self.indices.len()
    }
}

fn subdivide(vertices: &mut Vec<Vec3>, triangles: &[[u16; 3]]) -> Vec<[u16; 3]> {
    let mut lookup = HashMap::with_capacity(triangles.len() * 3 / 2);
    let mut result = Vec::with_capacity(triangles.len() * 4);

    for tri in triangles {
        let mid: [u16; 3] =
            std::array::from_fn(|edge| vertex_for_edge(&mut lookup, vertices, tri[edge], tri[(edge + 1) % 3]));

        result.push([tri[0], mid[0], mid[2]]);
        result.push([tri[1], mid[1], mid[0]]);
        result.push([tri[2], mid[2], mid[1]]);
        result.push(mid);
    }

    result
}

fn vertex_for_edge(
    lookup: &mut HashMap<(u16, u16), u16>,
    vertices: &mut Vec<Vec3>,
    first: u16,
    second: u16,
) -> u16 {
    let key = if first < second {
        (first, second)
    } else {
        (second, first)
    };

    *lookup.entry(key).or_insert_with(|| {
        let edge0 = vertices[first as usize];
        let edge1 = vertices[second as usize];
        vertices.push((edge0 + edge1).normalize());
        (vertices.len() - 1) as u16
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_form_counts() {
        for s in 0..=4 {
            let sphere = IcoSphere::new(s).unwrap();
            assert_eq!(sphere.vertices().len(), IcoSphere::vertex_count_for(s));
            assert_eq!(sphere.triangle_count(), IcoSphere::triangle_count_for(s));
        }
    }

    #[test]
    fn level_three() {
        let sphere = IcoSphere::new(3).unwrap();
        assert_eq!(sphere.vertices().len(), 642);
        assert_eq!(sphere.triangle_count(), 1280);
        assert_eq!(sphere.index_count(), 3840);
    }

    #[test]
    fn vertices_lie_on_unit_sphere() {
        let sphere = IcoSphere::new(2).unwrap();
        for v in sphere.vertices() {
            assert!((v.length() - 1.0).abs() < 1e-5, "{v}");
        }
    }

    #[test]
    fn faces_wind_outwards() {
        for s in [0, 2] {
            let sphere = IcoSphere::new(s).unwrap();
            let v = sphere.vertices();
            for &[a, b, c] in sphere.indices() {
                let (a, b, c) = (v[a as usize], v[b as usize], v[c as usize]);
                let normal = (b - a).cross(c - a);
                assert!(normal.dot(a + b + c) > 0.0);
            }
        }
    }

    #[test]
    fn edges_are_shared() {
        // a closed manifold: every edge is used by exactly two triangles
        let sphere = IcoSphere::new(2).unwrap();
        let mut edges: HashMap<(u16, u16), usize> = HashMap::new();
        for tri in sphere.indices() {
            for e in 0..3 {
                let (a, b) = (tri[e], tri[(e + 1) % 3]);
                *edges.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2));
        // Euler characteristic of a sphere
        let (v, e, f) = (sphere.vertices().len(), edges.len(), sphere.triangle_count());
        assert_eq!(v + f - e, 2);
    }

    #[test]
    fn rejects_levels_beyond_16_bit_indices() {
        assert!(IcoSphere::new(6).is_ok());
        assert_eq!(
            IcoSphere::new(7).unwrap_err(),
            GeometryError::TooManyVertices {
                subdivisions: 7,
                vertices: 163_842
            }
        );
        assert_eq!(IcoSphere::vertex_count_for(200), usize::MAX);
    }
}
