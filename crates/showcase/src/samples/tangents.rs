//! A spinning icosphere whose colours show the tangent of each vertex frame.

use anyhow::Context;
use glam::{Quat, Vec3, Vec4};

use crate::{
    app::{Sample, SetupContext},
    color::sRgb,
    engine::{
        AttributeType, Engine, Entity, IndexBuffer, IndexBufferId, IndexType, LightBuilder,
        LightType, Material, MaterialId, MaterialInstanceId, ParameterValue, PrimitiveType,
        RenderableBuilder, RgbType, SceneId, Skybox, SkyboxId, VertexAttribute, VertexBuffer,
        VertexBufferId, ViewId, EFFICIENCY_LED,
    },
    geometry::{Aabb, GeometryError, IcoSphere, SurfaceOrientation, TangentVertex},
    math::Transform,
    resources,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SphereMaterial {
    /// Unlit, shows the baked vertex colours.
    #[default]
    BakedColor,
    /// Lit, exercises the tangent frames through shading.
    SandboxLit,
}

#[derive(Debug, Clone, Copy)]
struct Resources {
    skybox: SkyboxId,
    vertex_buffer: VertexBufferId,
    index_buffer: IndexBufferId,
    light: Entity,
    material: MaterialId,
    material_instance: MaterialInstanceId,
    renderable: Entity,
    camera: Entity,
}

pub struct TangentSphere {
    material: SphereMaterial,
    vertices: Vec<TangentVertex>,
    triangles: Vec<[u16; 3]>,
    resources: Option<Resources>,
}

impl TangentSphere {
    pub const SUBDIVISIONS: u8 = 3;

    pub fn new(material: SphereMaterial) -> Result<Self, GeometryError> {
        let sphere = IcoSphere::new(Self::SUBDIVISIONS)?;
        let orientation = SurfaceOrientation::builder()
            .vertex_count(sphere.vertices().len())
            .positions(sphere.vertices())
            .triangles(sphere.indices())
            .build()?;

        let vertices = sphere
            .vertices()
            .iter()
            .zip(orientation.quats())
            .map(|(&p, &q)| TangentVertex::with_tangent_color(p, q))
            .collect();

        Ok(Self {
            material,
            vertices,
            triangles: sphere.indices().to_vec(),
            resources: None,
        })
    }

    pub fn vertices(&self) -> &[TangentVertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u16; 3]] {
        &self.triangles
    }

    pub fn renderable(&self) -> Option<Entity> {
        self.resources.map(|r| r.renderable)
    }

    pub fn camera(&self) -> Option<Entity> {
        self.resources.map(|r| r.camera)
    }
}

impl Sample for TangentSphere {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> anyhow::Result<()> {
        let engine = &mut *ctx.engine;
        let (view, scene) = (ctx.view, ctx.scene);

        let skybox = Skybox::builder()
            .color(Vec4::new(0.1, 0.125, 0.25, 1.0))
            .build(engine)?;
        engine.set_skybox(scene, Some(skybox))?;
        engine.view_mut(view)?.set_post_processing_enabled(false);

        let vertex_buffer = VertexBuffer::builder()
            .vertex_count(self.vertices.len())
            .buffer_count(1)
            .attribute(
                VertexAttribute::Position,
                0,
                AttributeType::Float3,
                0,
                TangentVertex::STRIDE,
            )
            .attribute(
                VertexAttribute::Color,
                0,
                AttributeType::UByte4,
                TangentVertex::COLOR_OFFSET,
                TangentVertex::STRIDE,
            )
            .normalized(VertexAttribute::Color)
            .attribute(
                VertexAttribute::Tangents,
                0,
                AttributeType::Float4,
                TangentVertex::TANGENTS_OFFSET,
                TangentVertex::STRIDE,
            )
            .build(engine)?;
        engine.set_buffer_at(vertex_buffer, 0, bytemuck::cast_slice(&self.vertices))?;

        let index_buffer = IndexBuffer::builder()
            .index_count(self.triangles.len() * 3)
            .buffer_type(IndexType::UShort)
            .build(engine)?;
        engine.set_index_buffer(index_buffer, bytemuck::cast_slice(&self.triangles))?;

        let light = engine.create_entity();
        LightBuilder::new(LightType::Point)
            .color(sRgb::from_array([0.98, 0.92, 0.89]).to_linear())
            .intensity_watts(1000.0, EFFICIENCY_LED)
            .position(Vec3::new(0.0, 0.0, -3.0))
            .light_channel(0, true)
            .build(engine, light)?;
        engine.add_entity(scene, light)?;

        let package = match self.material {
            SphereMaterial::BakedColor => &*resources::BAKED_COLOR,
            SphereMaterial::SandboxLit => &*resources::SANDBOX_LIT,
        };
        let material = Material::builder()
            .package(package)
            .build(engine)
            .with_context(|| format!("loading material `{}`", package.name()))?;
        let material_instance = engine.create_instance(material)?;
        if self.material == SphereMaterial::SandboxLit {
            for (name, value) in [
                ("baseColor", ParameterValue::Rgb(RgbType::Linear, Vec3::splat(0.8))),
                ("metallic", ParameterValue::Float(1.0)),
                ("roughness", ParameterValue::Float(0.4)),
                ("reflectance", ParameterValue::Float(0.5)),
            ] {
                engine.set_parameter(material_instance, name, value)?;
            }
        }

        let renderable = engine.create_entity();
        RenderableBuilder::new(1)
            .bounding_box(Aabb::UNIT)
            .material(0, material_instance)
            .geometry_range(
                0,
                PrimitiveType::Triangles,
                vertex_buffer,
                index_buffer,
                0,
                self.triangles.len() * 3,
            )
            .build(engine, renderable)?;
        engine.add_entity(scene, renderable)?;

        let camera = engine.create_entity();
        engine.create_camera(camera)?;
        let aspect = engine.view(view)?.viewport().aspect();
        {
            let cam = engine.camera_mut(camera)?;
            cam.set_lens_projection(28.0, aspect, 0.1, 100.0);
            cam.look_at(Vec3::new(0.0, 0.0, 4.5), Vec3::ZERO, Vec3::Y);
        }
        engine.set_view_camera(view, camera)?;

        log::info!(
            "tangent sphere: {} vertices, {} triangles, {:?}",
            self.vertices.len(),
            self.triangles.len(),
            self.material
        );
        self.resources = Some(Resources {
            skybox,
            vertex_buffer,
            index_buffer,
            light,
            material,
            material_instance,
            renderable,
            camera,
        });
        Ok(())
    }

    fn animate(&mut self, engine: &mut Engine, _view: ViewId, now: f64) -> anyhow::Result<()> {
        let res = self.resources.context("animate called before setup")?;
        let spin = Transform::from_rotation(Quat::from_rotation_y(now as f32));
        engine.set_transform(res.renderable, spin.into())?;
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine, _view: ViewId, scene: SceneId) -> anyhow::Result<()> {
        let Some(res) = self.resources.take() else {
            return Ok(());
        };
        engine.set_skybox(scene, None)?;
        engine.destroy(res.skybox)?;
        engine.destroy(res.renderable)?;
        engine.destroy(res.light)?;
        engine.destroy(res.material_instance)?;
        engine.destroy(res.material)?;
        engine.destroy(res.vertex_buffer)?;
        engine.destroy(res.index_buffer)?;
        engine.destroy_camera_component(res.camera)?;
        engine.destroy(res.camera)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::{
        app::{App, Config, Session},
        math::tangent_frame_axes,
    };

    #[test]
    fn sphere_geometry() {
        let sample = TangentSphere::new(SphereMaterial::BakedColor).unwrap();
        assert_eq!(sample.vertices().len(), 642);
        assert_eq!(sample.triangles().len(), 1280);

        for v in sample.vertices() {
            let p = Vec3::from(v.position);
            let (normal, _) = tangent_frame_axes(Quat::from_array(v.tangents));
            assert!(normal.dot(p) > 0.999, "{normal} vs {p}");
            assert_eq!(v.color >> 24, 0xff);
        }
    }

    #[test]
    fn setup_wires_the_scene() {
        let mut session = Session::new(Config::default()).unwrap();
        let mut sample = TangentSphere::new(SphereMaterial::SandboxLit).unwrap();
        session.setup(&mut sample).unwrap();

        let engine = session.engine();
        let view = engine.view(session.view()).unwrap();
        assert!(!view.post_processing_enabled());
        assert_eq!(view.camera(), sample.camera());

        let scene = engine.scene(session.scene()).unwrap();
        assert_eq!(scene.entity_count(), 2);
        assert!(scene.skybox().is_some());

        let renderable = sample.renderable().unwrap();
        let mi = engine.renderable(renderable).unwrap().primitives[0].material;
        assert_eq!(
            engine.material_instance(mi).unwrap().parameter("metallic"),
            Some(&ParameterValue::Float(1.0))
        );

        session.frame(&mut sample).unwrap();
        session.finish(&mut sample).unwrap();
    }

    #[test]
    fn spins_about_y() {
        let mut session = Session::new(Config::default()).unwrap();
        let mut sample = TangentSphere::new(SphereMaterial::BakedColor).unwrap();
        session.setup(&mut sample).unwrap();
        let renderable = sample.renderable().unwrap();
        let view = session.view();

        sample.animate(session.engine_mut(), view, 1.5).unwrap();
        let t = session.engine().transform(renderable);
        assert!(t.abs_diff_eq(Mat4::from_rotation_y(1.5), 1e-6));
        session.finish(&mut sample).unwrap();
    }

    #[test]
    fn full_run_leaves_nothing_behind() {
        let config = Config {
            frames: 5,
            ..Default::default()
        };
        let mut sample = TangentSphere::new(SphereMaterial::BakedColor).unwrap();
        let report = App::new(config).run(&mut sample).unwrap();
        assert_eq!(report.last_frame.len(), 1);
        assert_eq!(report.last_frame[0].renderables.len(), 1);
        assert_eq!(report.last_frame[0].lights, 1);
        assert!(sample.renderable().is_none());
    }
}
