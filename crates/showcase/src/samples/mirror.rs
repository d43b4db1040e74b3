//! A mesh reflected in two planar mirrors, each fed by an offscreen view.
//!
//! The reflection is obtained either by mirroring the offscreen camera or by drawing a
//! mirrored copy of the mesh. Mirroring the camera flips triangle winding, so the
//! offscreen views invert their front-face winding in that mode.

use std::path::PathBuf;

use anyhow::Context;
use glam::{Mat4, Vec3, Vec4};

use crate::{
    app::{Sample, SetupContext},
    color::sRgb,
    engine::{
        AttachmentPoint, AttributeType, ClearOptions, CompareMode, Engine, EngineError, Entity,
        IndexBuffer, IndexBufferId, IndexType, LightBuilder, LightType, MagFilter, Material,
        MaterialBuilder, MaterialId, MaterialInstanceId, MaterialPackage, MinFilter,
        ParameterType, ParameterValue, PrimitiveType, RenderTarget, RenderTargetId,
        RenderableBuilder, Renderer, RgbType, SceneId, Shading, TargetApi, Texture,
        TextureFormat, TextureId, TextureSampler, TextureUsage, VertexAttribute, VertexBuffer,
        VertexBufferId, ViewId, Viewport,
    },
    geometry::{Aabb, IcoSphere, MirrorQuad, UvVertex},
    loader::{load_obj, Mesh, MeshData},
    math::Transform,
    resources,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReflectionMode {
    /// The offscreen camera is mirrored.
    #[default]
    Camera,
    /// A mirrored copy of the mesh is drawn with an unmirrored camera.
    Renderables,
}

/// Where the reflected mesh comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshSource {
    IcoSphere { subdivisions: u8 },
    Obj(PathBuf),
}

impl Default for MeshSource {
    fn default() -> Self {
        MeshSource::IcoSphere { subdivisions: 2 }
    }
}

impl MeshSource {
    fn load(&self) -> anyhow::Result<MeshData> {
        match self {
            MeshSource::IcoSphere { subdivisions } => {
                Ok(MeshData::from_icosphere(&IcoSphere::new(*subdivisions)?))
            }
            MeshSource::Obj(path) => load_obj(path),
        }
    }
}

/// Facing direction shared by the mirrors, normalized on use.
pub const MIRROR_NORMAL: Vec3 = Vec3::new(1.0, 0.0, 2.0);
pub const MIRROR_HALF_EXTENT: f32 = 1.5;

/// Mirror centers and the attachment of the offscreen target each mirror displays.
const MIRRORS: [(Vec3, AttachmentPoint); 2] = [
    (Vec3::new(-2.0, 0.0, -5.0), AttachmentPoint::Color),
    (Vec3::new(2.0, 0.0, -5.0), AttachmentPoint::Depth),
];

const CLEAR_COLOR: Vec4 = Vec4::new(0.1, 0.2, 0.4, 1.0);

fn depth_quad_package() -> MaterialPackage {
    MaterialBuilder::new()
        .name("unlit_quad")
        .target_api(TargetApi::All)
        .require(VertexAttribute::Uv0)
        .parameter("albedo", ParameterType::Sampler2d)
        .material(
            "void material(inout MaterialInputs material) {
                prepareMaterial(material);
                vec2 uv = getResolution().zw * gl_FragCoord.xy;
                highp float depth = texture(materialParams_albedo, uv).r;
                material.baseColor.rgb = sign(vec3(depth));
                material.baseColor.a = 1.0;
            }",
        )
        .shading(Shading::Unlit)
        .build()
}

/// One mirror: the view rendering the reflection into a texture, the quad showing that
/// texture in the main scene, and the mirrored copy of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffscreenPass {
    pub view: ViewId,
    pub scene: SceneId,
    pub camera: Entity,
    pub color_texture: TextureId,
    pub depth_texture: TextureId,
    pub render_target: RenderTargetId,
    pub mirror: MirrorQuad,
    pub shows: AttachmentPoint,
    pub quad: Entity,
    pub quad_vertex_buffer: VertexBufferId,
    pub quad_index_buffer: IndexBufferId,
    pub quad_material: MaterialId,
    pub quad_material_instance: MaterialInstanceId,
    pub reflected: Entity,
}

impl OffscreenPass {
    fn new(
        engine: &mut Engine,
        viewport: Viewport,
        mirror: MirrorQuad,
        shows: AttachmentPoint,
        package: &MaterialPackage,
        mesh: &Mesh,
        mesh_instance: MaterialInstanceId,
    ) -> anyhow::Result<Self> {
        let view = engine.create_view();
        let scene = engine.create_scene();
        engine.set_view_scene(view, scene)?;
        engine.view_mut(view)?.set_post_processing_enabled(false);

        let color_texture = Texture::builder()
            .width(viewport.width)
            .height(viewport.height)
            .levels(1)
            .usage(TextureUsage::COLOR_ATTACHMENT | TextureUsage::SAMPLEABLE)
            .format(TextureFormat::Rgba8)
            .build(engine)?;
        let depth_texture = Texture::builder()
            .width(viewport.width)
            .height(viewport.height)
            .levels(1)
            .usage(TextureUsage::DEPTH_ATTACHMENT | TextureUsage::SAMPLEABLE)
            .format(TextureFormat::Depth24)
            .build(engine)?;
        let render_target = RenderTarget::builder()
            .texture(AttachmentPoint::Color, color_texture)
            .texture(AttachmentPoint::Depth, depth_texture)
            .build(engine)?;
        engine.set_view_render_target(view, Some(render_target))?;
        engine
            .view_mut(view)?
            .set_viewport(Viewport::new(0, 0, viewport.width, viewport.height));

        let camera = engine.create_entity();
        engine.create_camera(camera)?;
        engine.set_view_camera(view, camera)?;

        let vertices = mirror.vertices();
        let quad_vertex_buffer = VertexBuffer::builder()
            .vertex_count(vertices.len())
            .buffer_count(1)
            .attribute(VertexAttribute::Position, 0, AttributeType::Float3, 0, UvVertex::STRIDE)
            .attribute(
                VertexAttribute::Uv0,
                0,
                AttributeType::Float2,
                UvVertex::UV_OFFSET,
                UvVertex::STRIDE,
            )
            .build(engine)?;
        engine.set_buffer_at(quad_vertex_buffer, 0, bytemuck::cast_slice(&vertices))?;
        let quad_index_buffer = IndexBuffer::builder()
            .index_count(MirrorQuad::INDICES.len())
            .buffer_type(IndexType::UShort)
            .build(engine)?;
        engine.set_index_buffer(quad_index_buffer, bytemuck::cast_slice(&MirrorQuad::INDICES))?;

        let quad_material = Material::builder()
            .package(package)
            .build(engine)
            .with_context(|| format!("loading mirror material `{}`", package.name()))?;
        let quad_material_instance = engine.create_instance(quad_material)?;
        let shown = match shows {
            AttachmentPoint::Color => color_texture,
            AttachmentPoint::Depth => depth_texture,
        };
        let sampler = TextureSampler::new(MinFilter::Linear, MagFilter::Linear)
            .with_compare_mode(CompareMode::CompareToTexture);
        engine.set_parameter(
            quad_material_instance,
            "albedo",
            ParameterValue::Texture(shown, sampler),
        )?;

        let quad = engine.create_entity();
        let quad_bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position)))
            .unwrap_or(Aabb::UNIT);
        RenderableBuilder::new(1)
            .bounding_box(quad_bounds)
            .material(0, quad_material_instance)
            .geometry_range(
                0,
                PrimitiveType::Triangles,
                quad_vertex_buffer,
                quad_index_buffer,
                0,
                MirrorQuad::INDICES.len(),
            )
            .culling(false)
            .receive_shadows(false)
            .cast_shadows(false)
            .build(engine, quad)?;

        let reflected = engine.create_entity();
        RenderableBuilder::new(1)
            .bounding_box(Aabb::splat(2.0))
            .material(0, mesh_instance)
            .geometry(
                0,
                PrimitiveType::Triangles,
                mesh.vertex_buffer,
                mesh.index_buffer,
            )
            .receive_shadows(true)
            .cast_shadows(false)
            .build(engine, reflected)?;

        Ok(Self {
            view,
            scene,
            camera,
            color_texture,
            depth_texture,
            render_target,
            mirror,
            shows,
            quad,
            quad_vertex_buffer,
            quad_index_buffer,
            quad_material,
            quad_material_instance,
            reflected,
        })
    }

    fn apply_mode(
        &self,
        engine: &mut Engine,
        mesh: Entity,
        mode: ReflectionMode,
    ) -> Result<(), EngineError> {
        match mode {
            ReflectionMode::Renderables => {
                engine.add_entity(self.scene, self.reflected)?;
                engine.remove_entity(self.scene, mesh)?;
                engine.view_mut(self.view)?.set_front_face_winding_inverted(false);
            }
            ReflectionMode::Camera => {
                engine.add_entity(self.scene, mesh)?;
                engine.remove_entity(self.scene, self.reflected)?;
                engine.view_mut(self.view)?.set_front_face_winding_inverted(true);
            }
        }
        Ok(())
    }

    fn destroy_camera(&self, engine: &mut Engine) -> Result<(), EngineError> {
        engine.destroy_camera_component(self.camera)?;
        engine.destroy(self.camera)
    }

    fn destroy(&self, engine: &mut Engine) -> Result<(), EngineError> {
        engine.destroy(self.quad)?;
        engine.destroy(self.color_texture)?;
        engine.destroy(self.depth_texture)?;
        engine.destroy(self.render_target)?;
        engine.destroy(self.scene)?;
        engine.destroy(self.view)?;
        engine.destroy(self.quad_vertex_buffer)?;
        engine.destroy(self.quad_index_buffer)?;
        engine.destroy(self.quad_material_instance)?;
        engine.destroy(self.quad_material)
    }
}

#[derive(Debug, Clone)]
struct State {
    light: Entity,
    mesh_material: MaterialId,
    mesh_instance: MaterialInstanceId,
    mesh: Mesh,
    /// Placement of the mesh before animation.
    base: Mat4,
    passes: Vec<OffscreenPass>,
}

pub struct MirrorSample {
    mode: ReflectionMode,
    mesh_source: MeshSource,
    state: Option<State>,
}

impl MirrorSample {
    pub fn new(mode: ReflectionMode, mesh_source: MeshSource) -> Self {
        Self {
            mode,
            mesh_source,
            state: None,
        }
    }

    pub fn mode(&self) -> ReflectionMode {
        self.mode
    }

    /// Offscreen passes, empty before setup and after cleanup.
    pub fn passes(&self) -> &[OffscreenPass] {
        match &self.state {
            Some(state) => &state.passes,
            None => &[],
        }
    }

    pub fn mesh_renderable(&self) -> Option<Entity> {
        self.state.as_ref().map(|s| s.mesh.renderable)
    }

    pub fn light(&self) -> Option<Entity> {
        self.state.as_ref().map(|s| s.light)
    }

    /// Switches every offscreen pass between a mirrored camera and a mirrored mesh.
    /// Before setup only the mode is recorded.
    pub fn set_reflection_mode(
        &mut self,
        engine: &mut Engine,
        mode: ReflectionMode,
    ) -> Result<(), EngineError> {
        self.mode = mode;
        if let Some(state) = &self.state {
            for pass in &state.passes {
                pass.apply_mode(engine, state.mesh.renderable, mode)?;
            }
            log::debug!("reflection mode: {mode:?}");
        }
        Ok(())
    }

    fn load_mesh(
        &self,
        engine: &mut Engine,
    ) -> anyhow::Result<(MaterialId, MaterialInstanceId, Mesh)> {
        let material = Material::builder()
            .package(&resources::DEFAULT_LIT)
            .build(engine)?;
        let mi = engine.create_instance(material)?;
        for (name, value) in [
            ("baseColor", ParameterValue::Rgb(RgbType::Linear, Vec3::new(0.8, 1.0, 1.0))),
            ("metallic", ParameterValue::Float(0.0)),
            ("roughness", ParameterValue::Float(0.4)),
            ("reflectance", ParameterValue::Float(0.5)),
        ] {
            engine.set_parameter(mi, name, value)?;
        }

        let data = self
            .mesh_source
            .load()
            .with_context(|| format!("loading mesh from {:?}", self.mesh_source))?;
        let mesh = data.upload(engine, mi)?;
        Ok((material, mi, mesh))
    }
}

impl Sample for MirrorSample {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> anyhow::Result<()> {
        let depth_package = depth_quad_package();
        anyhow::ensure!(
            depth_package.is_valid(),
            "failed to build material `{}`: {}",
            depth_package.name(),
            depth_package.errors().join("; ")
        );

        let (mesh_material, mesh_instance, mesh) = self.load_mesh(ctx.engine)?;
        let base = Transform::from_translation(Vec3::new(0.0, 0.0, -4.0)).into_matrix()
            * ctx.engine.transform(mesh.renderable);
        ctx.engine.set_cast_shadows(mesh.renderable, false)?;
        ctx.engine.add_entity(ctx.scene, mesh.renderable)?;

        let viewport = ctx.engine.view(ctx.view)?.viewport();
        let mut passes = Vec::with_capacity(MIRRORS.len());
        for (center, shows) in MIRRORS {
            let mirror = MirrorQuad::new(center, MIRROR_NORMAL, MIRROR_HALF_EXTENT)?;
            let package = match shows {
                AttachmentPoint::Color => &*resources::MIRROR,
                AttachmentPoint::Depth => &depth_package,
            };
            let pass = OffscreenPass::new(
                ctx.engine,
                viewport,
                mirror,
                shows,
                package,
                &mesh,
                mesh_instance,
            )?;
            ctx.engine.add_entity(ctx.scene, pass.quad)?;
            ctx.add_offscreen_view(pass.view);
            passes.push(pass);
        }

        let light = ctx.engine.create_entity();
        LightBuilder::new(LightType::Sun)
            .color(sRgb::from_array([0.98, 0.92, 0.89]).to_linear())
            .intensity(110_000.0)
            .direction(Vec3::new(0.7, -1.0, -0.8))
            .sun_angular_radius(1.9)
            .cast_shadows(false)
            .build(ctx.engine, light)?;
        ctx.engine.add_entity(ctx.scene, light)?;
        for pass in &passes {
            ctx.engine.add_entity(pass.scene, light)?;
        }

        self.state = Some(State {
            light,
            mesh_material,
            mesh_instance,
            mesh,
            base,
            passes,
        });
        self.set_reflection_mode(ctx.engine, self.mode)?;
        log::info!("mirror sample ready ({:?} reflection)", self.mode);
        Ok(())
    }

    fn animate(&mut self, engine: &mut Engine, view: ViewId, now: f64) -> anyhow::Result<()> {
        let state = self.state.as_ref().context("animate called before setup")?;

        let slide = Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5 + now.sin() as f32));
        let xform = state.base * slide * Mat4::from_rotation_y(now as f32);
        engine.set_transform(state.mesh.renderable, xform)?;

        let main_camera = engine.view(view)?.camera().context("main view has no camera")?;
        let camera = *engine.camera(main_camera)?;
        let model = camera.model_matrix();

        for pass in &state.passes {
            let reflection = pass.mirror.plane().reflection_matrix();
            engine.set_transform(pass.reflected, reflection * xform)?;

            let offscreen = engine.camera_mut(pass.camera)?;
            offscreen.set_custom_projection(
                camera.projection_matrix(),
                camera.culling_projection_matrix(),
                camera.near(),
                camera.culling_far(),
            );
            offscreen.set_model_matrix(match self.mode {
                ReflectionMode::Renderables => model,
                ReflectionMode::Camera => reflection * model,
            });
        }
        Ok(())
    }

    fn pre_render(&mut self, _: &Engine, _: ViewId, _: SceneId, renderer: &mut Renderer) {
        renderer.set_clear_options(ClearOptions {
            clear_color: CLEAR_COLOR,
            clear: false,
            discard: false,
        });
    }

    fn cleanup(&mut self, engine: &mut Engine, _: ViewId, _: SceneId) -> anyhow::Result<()> {
        let Some(state) = self.state.take() else {
            return Ok(());
        };
        for pass in &state.passes {
            pass.destroy_camera(engine)?;
        }

        for pass in &state.passes {
            engine.destroy(pass.reflected)?;
        }
        engine.destroy(state.light)?;
        engine.destroy(state.mesh_instance)?;
        engine.destroy(state.mesh_material)?;
        engine.destroy(state.mesh.renderable)?;
        engine.destroy(state.mesh.vertex_buffer)?;
        engine.destroy(state.mesh.index_buffer)?;

        for pass in &state.passes {
            pass.destroy(engine)?;
        }
        Ok(())
    }
}
