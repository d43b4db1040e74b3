use crate::geometry::Aabb;

use super::{lookup, Engine, EngineError, Entity, IndexBufferId, MaterialInstanceId, VertexBufferId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrimitiveType {
    Points,
    Lines,
    #[default]
    Triangles,
}

impl PrimitiveType {
    fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveType::Points => 1,
            PrimitiveType::Lines => 2,
            PrimitiveType::Triangles => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub ty: PrimitiveType,
    pub vertices: VertexBufferId,
    pub indices: IndexBufferId,
    /// Index range, `None` for the whole buffer.
    pub range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub material: MaterialInstanceId,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub bounds: Aabb,
    pub primitives: Vec<Primitive>,
    pub culling: bool,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

#[derive(Debug, Clone, Default)]
struct PrimitiveSlot {
    material: Option<MaterialInstanceId>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Clone)]
pub struct RenderableBuilder {
    bounds: Option<Aabb>,
    slots: Vec<PrimitiveSlot>,
    culling: bool,
    cast_shadows: bool,
    receive_shadows: bool,
    out_of_range: Option<usize>,
}

impl RenderableBuilder {
    pub fn new(primitive_count: usize) -> Self {
        Self {
            bounds: None,
            slots: vec![PrimitiveSlot::default(); primitive_count],
            culling: true,
            cast_shadows: false,
            receive_shadows: true,
            out_of_range: None,
        }
    }

    fn slot(&mut self, index: usize) -> Option<&mut PrimitiveSlot> {
        if index >= self.slots.len() {
            self.out_of_range.get_or_insert(index);
        }
        self.slots.get_mut(index)
    }

    pub fn bounding_box(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn material(mut self, index: usize, material: MaterialInstanceId) -> Self {
        if let Some(slot) = self.slot(index) {
            slot.material = Some(material);
        }
        self
    }

    /// Draws the whole index buffer.
    pub fn geometry(
        mut self,
        index: usize,
        ty: PrimitiveType,
        vertices: VertexBufferId,
        indices: IndexBufferId,
    ) -> Self {
        if let Some(slot) = self.slot(index) {
            slot.geometry = Some(Geometry {
                ty,
                vertices,
                indices,
                range: None,
            });
        }
        self
    }

    pub fn geometry_range(
        mut self,
        index: usize,
        ty: PrimitiveType,
        vertices: VertexBufferId,
        indices: IndexBufferId,
        offset: usize,
        count: usize,
    ) -> Self {
        if let Some(slot) = self.slot(index) {
            slot.geometry = Some(Geometry {
                ty,
                vertices,
                indices,
                range: Some((offset, count)),
            });
        }
        self
    }

    pub fn culling(mut self, enabled: bool) -> Self {
        self.culling = enabled;
        self
    }

    pub fn cast_shadows(mut self, enabled: bool) -> Self {
        self.cast_shadows = enabled;
        self
    }

    pub fn receive_shadows(mut self, enabled: bool) -> Self {
        self.receive_shadows = enabled;
        self
    }

    pub fn build(self, engine: &mut Engine, entity: Entity) -> Result<(), EngineError> {
        let invalid = |reason: String| EngineError::InvalidBuilder {
            what: "renderable",
            reason,
        };

        engine.check_entity(entity)?;
        if engine.renderables.contains_key(&entity) {
            return Err(EngineError::DuplicateComponent {
                entity,
                component: "renderable",
            });
        }
        if let Some(index) = self.out_of_range {
            return Err(invalid(format!(
                "primitive {index} of {} set",
                self.slots.len()
            )));
        }
        if self.slots.is_empty() {
            return Err(invalid("no primitive".into()));
        }
        let bounds = self
            .bounds
            .ok_or_else(|| invalid("no bounding box".into()))?;

        let mut primitives = Vec::with_capacity(self.slots.len());
        for (i, slot) in self.slots.into_iter().enumerate() {
            let geometry = slot
                .geometry
                .ok_or_else(|| invalid(format!("primitive {i} has no geometry")))?;
            let material = slot
                .material
                .ok_or_else(|| invalid(format!("primitive {i} has no material")))?;

            let vertices = lookup(&engine.vertex_buffers, geometry.vertices)?;
            let instance = lookup(&engine.material_instances, material)?;
            let parent = lookup(&engine.materials, instance.material())?;
            if let Some(missing) = parent
                .required_attributes()
                .find(|&attribute| !vertices.has_attribute(attribute))
            {
                return Err(invalid(format!(
                    "primitive {i}: material {} needs {missing:?} but {} has none",
                    parent.name(),
                    geometry.vertices
                )));
            }

            let index_count = lookup(&engine.index_buffers, geometry.indices)?.index_count();
            let (offset, count) = geometry.range.unwrap_or((0, index_count));
            if offset.checked_add(count).map_or(true, |end| end > index_count) {
                return Err(invalid(format!(
                    "primitive {i} reads {count} indices from {offset}, buffer has {index_count}"
                )));
            }
            if count % geometry.ty.vertices_per_primitive() != 0 {
                return Err(invalid(format!(
                    "primitive {i}: {count} indices do not form whole {:?}",
                    geometry.ty
                )));
            }
            primitives.push(Primitive { material, geometry });
        }

        log::trace!("renderable on {entity}: {} primitive(s)", primitives.len());
        engine.renderables.insert(
            entity,
            Renderable {
                bounds,
                primitives,
                culling: self.culling,
                cast_shadows: self.cast_shadows,
                receive_shadows: self.receive_shadows,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        AttributeType, IndexBuffer, IndexType, Material, MaterialBuilder, VertexAttribute,
        VertexBuffer,
    };

    struct Fixture {
        engine: Engine,
        vb: VertexBufferId,
        ib: IndexBufferId,
        mi: MaterialInstanceId,
    }

    fn fixture() -> Fixture {
        let mut engine = Engine::default();
        let vb = VertexBuffer::builder()
            .vertex_count(4)
            .buffer_count(1)
            .attribute(VertexAttribute::Position, 0, AttributeType::Float3, 0, 12)
            .build(&mut engine)
            .unwrap();
        let ib = IndexBuffer::builder()
            .index_count(6)
            .buffer_type(IndexType::UShort)
            .build(&mut engine)
            .unwrap();
        let package = MaterialBuilder::new()
            .name("plain")
            .material("void material(inout MaterialInputs material) { prepareMaterial(material); }")
            .build();
        let material = Material::builder().package(&package).build(&mut engine).unwrap();
        let mi = engine.create_instance(material).unwrap();
        Fixture { engine, vb, ib, mi }
    }

    #[test]
    fn builds_full_and_ranged_geometry() {
        let Fixture { mut engine, vb, ib, mi } = fixture();
        let whole = engine.create_entity();
        RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .geometry(0, PrimitiveType::Triangles, vb, ib)
            .build(&mut engine, whole)
            .unwrap();
        assert!(engine.renderable(whole).unwrap().receive_shadows);

        let ranged = engine.create_entity();
        RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .geometry_range(0, PrimitiveType::Triangles, vb, ib, 3, 3)
            .cast_shadows(true)
            .build(&mut engine, ranged)
            .unwrap();
        engine.set_cast_shadows(ranged, false).unwrap();
        assert!(!engine.renderable(ranged).unwrap().cast_shadows);
    }

    #[test]
    fn rejects_incomplete_or_out_of_range() {
        let Fixture { mut engine, vb, ib, mi } = fixture();
        let e = engine.create_entity();

        let past_end = RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .geometry_range(0, PrimitiveType::Triangles, vb, ib, 3, 6)
            .build(&mut engine, e);
        assert!(past_end.is_err());

        let no_material = RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .geometry(0, PrimitiveType::Triangles, vb, ib)
            .build(&mut engine, e);
        assert!(no_material.is_err());

        let bad_slot = RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .material(1, mi)
            .geometry(0, PrimitiveType::Triangles, vb, ib)
            .build(&mut engine, e);
        assert!(bad_slot.is_err());

        let no_bounds = RenderableBuilder::new(1)
            .material(0, mi)
            .geometry(0, PrimitiveType::Triangles, vb, ib)
            .build(&mut engine, e);
        assert!(no_bounds.is_err());

        assert!(engine.renderable(e).is_err());
    }

    #[test]
    fn huge_range_offset_is_an_error() {
        let Fixture { mut engine, vb, ib, mi } = fixture();
        let e = engine.create_entity();
        let result = RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .geometry_range(0, PrimitiveType::Triangles, vb, ib, usize::MAX, 3)
            .build(&mut engine, e);
        assert!(matches!(result, Err(EngineError::InvalidBuilder { .. })));
    }

    #[test]
    fn vertex_buffer_must_carry_required_attributes() {
        let Fixture { mut engine, vb, ib, .. } = fixture();
        let package = MaterialBuilder::new()
            .name("colored")
            .require(VertexAttribute::Color)
            .material("void material(inout MaterialInputs material) { prepareMaterial(material); }")
            .build();
        let material = Material::builder().package(&package).build(&mut engine).unwrap();
        let mi = engine.create_instance(material).unwrap();
        let e = engine.create_entity();

        let result = RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(1.0))
            .material(0, mi)
            .geometry(0, PrimitiveType::Triangles, vb, ib)
            .build(&mut engine, e);
        match result {
            Err(EngineError::InvalidBuilder { reason, .. }) => assert!(reason.contains("Color")),
            other => panic!("expected a missing attribute error, got {other:?}"),
        }
        assert!(engine.renderable(e).is_err());
    }
}
