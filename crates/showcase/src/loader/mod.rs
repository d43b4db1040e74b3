//! Turns CPU-side meshes into engine buffers and a renderable.

pub mod obj;

pub use obj::load_obj;

use anyhow::Context;
use glam::Vec3;

use crate::{
    engine::{
        AttributeType, Engine, Entity, IndexBuffer, IndexBufferId, IndexType, MaterialInstanceId,
        PrimitiveType, RenderableBuilder, VertexAttribute, VertexBuffer, VertexBufferId,
    },
    geometry::{Aabb, IcoSphere, MeshVertex, SurfaceOrientation},
};

/// Triangle mesh as read from disk or generated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, when the source provides them.
    pub normals: Option<Vec<Vec3>>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn from_icosphere(sphere: &IcoSphere) -> Self {
        Self {
            positions: sphere.vertices().to_vec(),
            // the unit sphere is its own normal field
            normals: Some(sphere.vertices().to_vec()),
            triangles: sphere.indices().iter().map(|t| t.map(u32::from)).collect(),
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Computes tangent frames and packs them with the positions.
    pub fn vertices(&self) -> anyhow::Result<Vec<MeshVertex>> {
        let mut builder = SurfaceOrientation::builder()
            .vertex_count(self.positions.len())
            .positions(&self.positions)
            .triangles_u32(&self.triangles);
        if let Some(normals) = &self.normals {
            builder = builder.normals(normals);
        }
        let orientation = builder.build().context("computing mesh tangent frames")?;

        Ok(self
            .positions
            .iter()
            .zip(orientation.quats())
            .map(|(&p, &q)| MeshVertex::new(p, q))
            .collect())
    }

    /// Uploads the mesh and creates a renderable drawing it with `material`.
    pub fn upload(&self, engine: &mut Engine, material: MaterialInstanceId) -> anyhow::Result<Mesh> {
        let bounds = self.bounds().context("mesh has no vertices")?;
        let vertices = self.vertices()?;

        let vertex_buffer = VertexBuffer::builder()
            .vertex_count(vertices.len())
            .buffer_count(1)
            .attribute(
                VertexAttribute::Position,
                0,
                AttributeType::Float3,
                0,
                MeshVertex::STRIDE,
            )
            .attribute(
                VertexAttribute::Tangents,
                0,
                AttributeType::Float4,
                MeshVertex::TANGENTS_OFFSET,
                MeshVertex::STRIDE,
            )
            .build(engine)?;
        engine.set_buffer_at(vertex_buffer, 0, bytemuck::cast_slice(&vertices))?;

        let index_buffer = IndexBuffer::builder()
            .index_count(self.triangles.len() * 3)
            .buffer_type(IndexType::UInt)
            .build(engine)?;
        engine.set_index_buffer(index_buffer, bytemuck::cast_slice(&self.triangles))?;

        let renderable = engine.create_entity();
        RenderableBuilder::new(1)
            .bounding_box(bounds)
            .material(0, material)
            .geometry(0, PrimitiveType::Triangles, vertex_buffer, index_buffer)
            .receive_shadows(true)
            .build(engine, renderable)?;

        log::debug!(
            "uploaded mesh: {} vertices, {} triangles, bounds {:?}",
            vertices.len(),
            self.triangles.len(),
            bounds
        );
        Ok(Mesh {
            renderable,
            vertex_buffer,
            index_buffer,
            bounds,
        })
    }
}

/// Engine resources of an uploaded [MeshData].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub renderable: Entity,
    pub vertex_buffer: VertexBufferId,
    pub index_buffer: IndexBufferId,
    pub bounds: Aabb,
}
