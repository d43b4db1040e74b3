//! Headless stand-in for the rendering engine the samples drive.
//!
//! It keeps the engine's object model (typed handles, builders, explicit destruction,
//! scenes as entity sets, views, cameras, transforms) and validates every call, but
//! never touches a GPU: rendering a view only reports what the view would draw.

mod buffer;
mod camera;
mod light;
mod material;
mod renderable;
mod renderer;
mod texture;
mod view;

pub use buffer::{
    AttributeLayout, AttributeType, IndexBuffer, IndexBufferBuilder, IndexType, VertexAttribute, VertexBuffer,
    VertexBufferBuilder,
};
pub use camera::Camera;
pub use light::{Light, LightBuilder, LightType, EFFICIENCY_LED};
pub use material::{
    CompareMode, MagFilter, Material, MaterialBuilder, MaterialInstance, MaterialLoader,
    MaterialPackage,
    MinFilter, ParameterType, ParameterValue, RgbType, Shading, TargetApi, TextureSampler,
};
pub use renderable::{Geometry, Primitive, PrimitiveType, Renderable, RenderableBuilder};
pub use renderer::{ClearOptions, RenderedView, Renderer};
pub use texture::{
    AttachmentPoint, RenderTarget, RenderTargetBuilder, Texture, TextureBuilder, TextureFormat,
    TextureUsage,
};
pub use view::{Scene, Skybox, SkyboxBuilder, View, Viewport};

use std::collections::{BTreeMap, BTreeSet};

use glam::Mat4;

/// Graphics API the engine was created for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Backend {
    #[default]
    #[display("OpenGL")]
    OpenGl,
    #[display("Vulkan")]
    Vulkan,
    #[display("Metal")]
    Metal,
}

macro_rules! handles {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub fn id(self) -> u32 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}#{}", stringify!($name), self.0)
                }
            }

            impl From<$name> for Resource {
                fn from(handle: $name) -> Self {
                    Resource::$name(handle)
                }
            }
        )+

        /// Any object owned by the [Engine].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Resource {
            $($name($name),)+
        }

        impl std::fmt::Display for Resource {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Resource::$name(h) => std::fmt::Display::fmt(h, f),)+
                }
            }
        }
    };
}

handles!(
    /// Identity of a scene object; components (renderable, light, camera, transform) hang off it.
    Entity,
    VertexBufferId,
    IndexBufferId,
    TextureId,
    RenderTargetId,
    MaterialId,
    MaterialInstanceId,
    ViewId,
    SceneId,
    SkyboxId,
);

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display("{resource} does not exist or was already destroyed")]
    UnknownResource { resource: Resource },
    #[display("invalid {what}: {reason}")]
    InvalidBuilder { what: &'static str, reason: String },
    #[display("{resource}: expected {expected} bytes, got {found}")]
    BufferSizeMismatch {
        resource: Resource,
        expected: usize,
        found: usize,
    },
    #[display("material package `{name}` is not valid")]
    InvalidPackage { name: String },
    #[display("parameter `{name}` of material `{material}`: {reason}")]
    InvalidParameter {
        material: String,
        name: String,
        reason: String,
    },
    #[display("{entity} has no {component} component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
    #[display("{entity} already has a {component} component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },
    #[display("{resource} is still in use: {reason}")]
    InUse {
        resource: Resource,
        reason: &'static str,
    },
    #[display("{} resource(s) were never destroyed: {}", resources.len(), list_resources(resources))]
    Leaked { resources: Vec<Resource> },
}

fn list_resources(resources: &[Resource]) -> String {
    resources
        .iter()
        .map(Resource::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn lookup<K, T>(map: &BTreeMap<K, T>, id: K) -> Result<&T, EngineError>
where
    K: Ord + Copy + Into<Resource>,
{
    map.get(&id)
        .ok_or(EngineError::UnknownResource { resource: id.into() })
}

fn lookup_mut<K, T>(map: &mut BTreeMap<K, T>, id: K) -> Result<&mut T, EngineError>
where
    K: Ord + Copy + Into<Resource>,
{
    map.get_mut(&id)
        .ok_or(EngineError::UnknownResource { resource: id.into() })
}

fn remove<K, T>(map: &mut BTreeMap<K, T>, id: K) -> Result<T, EngineError>
where
    K: Ord + Copy + Into<Resource>,
{
    map.remove(&id)
        .ok_or(EngineError::UnknownResource { resource: id.into() })
}

/// Owns every object created through the builders until it is explicitly destroyed.
#[derive(Debug, Default)]
pub struct Engine {
    backend: Backend,
    next_id: u32,

    entities: BTreeSet<Entity>,
    transforms: BTreeMap<Entity, Mat4>,
    renderables: BTreeMap<Entity, Renderable>,
    lights: BTreeMap<Entity, Light>,
    cameras: BTreeMap<Entity, Camera>,

    vertex_buffers: BTreeMap<VertexBufferId, VertexBuffer>,
    index_buffers: BTreeMap<IndexBufferId, IndexBuffer>,
    textures: BTreeMap<TextureId, Texture>,
    render_targets: BTreeMap<RenderTargetId, RenderTarget>,
    materials: BTreeMap<MaterialId, Material>,
    material_instances: BTreeMap<MaterialInstanceId, MaterialInstance>,
    views: BTreeMap<ViewId, View>,
    scenes: BTreeMap<SceneId, Scene>,
    skyboxes: BTreeMap<SkyboxId, Skybox>,
}

impl Engine {
    pub fn new(backend: Backend) -> Self {
        log::info!("creating headless engine ({backend} backend)");
        Self {
            backend,
            ..Default::default()
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // == Entities and transforms ==

    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity(self.next_id());
        self.entities.insert(entity);
        entity
    }

    fn check_entity(&self, entity: Entity) -> Result<(), EngineError> {
        if self.entities.contains(&entity) {
            Ok(())
        } else {
            Err(EngineError::UnknownResource {
                resource: entity.into(),
            })
        }
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Mat4) -> Result<(), EngineError> {
        self.check_entity(entity)?;
        self.transforms.insert(entity, transform);
        Ok(())
    }

    /// World transform of the entity, identity when none was ever set.
    pub fn transform(&self, entity: Entity) -> Mat4 {
        self.transforms
            .get(&entity)
            .copied()
            .unwrap_or(Mat4::IDENTITY)
    }

    // == Components ==

    pub fn renderable(&self, entity: Entity) -> Result<&Renderable, EngineError> {
        self.renderables
            .get(&entity)
            .ok_or(EngineError::MissingComponent {
                entity,
                component: "renderable",
            })
    }

    pub fn set_cast_shadows(&mut self, entity: Entity, enabled: bool) -> Result<(), EngineError> {
        self.renderables
            .get_mut(&entity)
            .ok_or(EngineError::MissingComponent {
                entity,
                component: "renderable",
            })?
            .cast_shadows = enabled;
        Ok(())
    }

    pub fn light(&self, entity: Entity) -> Result<&Light, EngineError> {
        self.lights.get(&entity).ok_or(EngineError::MissingComponent {
            entity,
            component: "light",
        })
    }

    pub fn create_camera(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.check_entity(entity)?;
        if self.cameras.contains_key(&entity) {
            return Err(EngineError::DuplicateComponent {
                entity,
                component: "camera",
            });
        }
        self.cameras.insert(entity, Camera::default());
        Ok(())
    }

    pub fn camera(&self, entity: Entity) -> Result<&Camera, EngineError> {
        self.cameras.get(&entity).ok_or(EngineError::MissingComponent {
            entity,
            component: "camera",
        })
    }

    pub fn camera_mut(&mut self, entity: Entity) -> Result<&mut Camera, EngineError> {
        self.cameras
            .get_mut(&entity)
            .ok_or(EngineError::MissingComponent {
                entity,
                component: "camera",
            })
    }

    pub fn destroy_camera_component(&mut self, entity: Entity) -> Result<(), EngineError> {
        self.cameras
            .remove(&entity)
            .map(|_| ())
            .ok_or(EngineError::MissingComponent {
                entity,
                component: "camera",
            })
    }

    // == Buffers, textures, materials ==

    pub fn vertex_buffer(&self, id: VertexBufferId) -> Result<&VertexBuffer, EngineError> {
        lookup(&self.vertex_buffers, id)
    }

    /// Uploads the content of buffer slot `buffer_index`. The byte count must match
    /// `vertex_count × stride` of the attributes stored in that slot.
    pub fn set_buffer_at(
        &mut self,
        id: VertexBufferId,
        buffer_index: u8,
        data: &[u8],
    ) -> Result<(), EngineError> {
        lookup_mut(&mut self.vertex_buffers, id)?.upload(id, buffer_index, data)
    }

    pub fn index_buffer(&self, id: IndexBufferId) -> Result<&IndexBuffer, EngineError> {
        lookup(&self.index_buffers, id)
    }

    pub fn set_index_buffer(&mut self, id: IndexBufferId, data: &[u8]) -> Result<(), EngineError> {
        lookup_mut(&mut self.index_buffers, id)?.upload(id, data)
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture, EngineError> {
        lookup(&self.textures, id)
    }

    pub fn render_target(&self, id: RenderTargetId) -> Result<&RenderTarget, EngineError> {
        lookup(&self.render_targets, id)
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material, EngineError> {
        lookup(&self.materials, id)
    }

    pub fn create_instance(
        &mut self,
        material: MaterialId,
    ) -> Result<MaterialInstanceId, EngineError> {
        let instance = lookup(&self.materials, material)?.instantiate(material);
        let id = MaterialInstanceId(self.next_id());
        self.material_instances.insert(id, instance);
        Ok(id)
    }

    pub fn material_instance(
        &self,
        id: MaterialInstanceId,
    ) -> Result<&MaterialInstance, EngineError> {
        lookup(&self.material_instances, id)
    }

    pub fn set_parameter(
        &mut self,
        id: MaterialInstanceId,
        name: &str,
        value: ParameterValue,
    ) -> Result<(), EngineError> {
        if let ParameterValue::Texture(texture, _) = value {
            lookup(&self.textures, texture)?;
        }
        let instance = lookup(&self.material_instances, id)?;
        let material = lookup(&self.materials, instance.material())?;
        material.check_parameter(name, &value)?;

        lookup_mut(&mut self.material_instances, id)?.set(name, value);
        Ok(())
    }

    // == Views and scenes ==

    pub fn create_view(&mut self) -> ViewId {
        let id = ViewId(self.next_id());
        self.views.insert(id, View::default());
        id
    }

    pub fn view(&self, id: ViewId) -> Result<&View, EngineError> {
        lookup(&self.views, id)
    }

    /// Access to the view's plain settings (viewport, post-processing, winding).
    pub fn view_mut(&mut self, id: ViewId) -> Result<&mut View, EngineError> {
        lookup_mut(&mut self.views, id)
    }

    pub fn set_view_scene(&mut self, view: ViewId, scene: SceneId) -> Result<(), EngineError> {
        lookup(&self.scenes, scene)?;
        lookup_mut(&mut self.views, view)?.scene = Some(scene);
        Ok(())
    }

    pub fn set_view_camera(&mut self, view: ViewId, camera: Entity) -> Result<(), EngineError> {
        self.camera(camera)?;
        lookup_mut(&mut self.views, view)?.camera = Some(camera);
        Ok(())
    }

    pub fn set_view_render_target(
        &mut self,
        view: ViewId,
        target: Option<RenderTargetId>,
    ) -> Result<(), EngineError> {
        if let Some(target) = target {
            lookup(&self.render_targets, target)?;
        }
        lookup_mut(&mut self.views, view)?.render_target = target;
        Ok(())
    }

    pub fn create_scene(&mut self) -> SceneId {
        let id = SceneId(self.next_id());
        self.scenes.insert(id, Scene::default());
        id
    }

    pub fn scene(&self, id: SceneId) -> Result<&Scene, EngineError> {
        lookup(&self.scenes, id)
    }

    /// Adding an entity that is already in the scene does nothing.
    pub fn add_entity(&mut self, scene: SceneId, entity: Entity) -> Result<(), EngineError> {
        self.check_entity(entity)?;
        lookup_mut(&mut self.scenes, scene)?.entities.insert(entity);
        Ok(())
    }

    /// Removing an entity that is not in the scene does nothing.
    pub fn remove_entity(&mut self, scene: SceneId, entity: Entity) -> Result<(), EngineError> {
        lookup_mut(&mut self.scenes, scene)?.entities.remove(&entity);
        Ok(())
    }

    pub fn set_skybox(
        &mut self,
        scene: SceneId,
        skybox: Option<SkyboxId>,
    ) -> Result<(), EngineError> {
        if let Some(skybox) = skybox {
            lookup(&self.skyboxes, skybox)?;
        }
        lookup_mut(&mut self.scenes, scene)?.skybox = skybox;
        Ok(())
    }

    pub fn skybox(&self, id: SkyboxId) -> Result<&Skybox, EngineError> {
        lookup(&self.skyboxes, id)
    }

    // == Destruction ==

    /// Destroys any resource. Destroying an entity also destroys its renderable, light
    /// and transform components, but its camera component has to be destroyed first.
    pub fn destroy(&mut self, resource: impl Into<Resource>) -> Result<(), EngineError> {
        let resource = resource.into();
        log::trace!("destroying {resource}");
        match resource {
            Resource::Entity(entity) => {
                self.check_entity(entity)?;
                if self.cameras.contains_key(&entity) {
                    return Err(EngineError::InUse {
                        resource,
                        reason: "its camera component must be destroyed first",
                    });
                }
                self.entities.remove(&entity);
                self.renderables.remove(&entity);
                self.lights.remove(&entity);
                self.transforms.remove(&entity);
                for scene in self.scenes.values_mut() {
                    scene.entities.remove(&entity);
                }
            }
            Resource::VertexBufferId(id) => {
                remove(&mut self.vertex_buffers, id)?;
            }
            Resource::IndexBufferId(id) => {
                remove(&mut self.index_buffers, id)?;
            }
            Resource::TextureId(id) => {
                remove(&mut self.textures, id)?;
            }
            Resource::RenderTargetId(id) => {
                remove(&mut self.render_targets, id)?;
            }
            Resource::MaterialId(id) => {
                lookup(&self.materials, id)?;
                if self
                    .material_instances
                    .values()
                    .any(|mi| mi.material() == id)
                {
                    return Err(EngineError::InUse {
                        resource,
                        reason: "material instances created from it are still alive",
                    });
                }
                self.materials.remove(&id);
            }
            Resource::MaterialInstanceId(id) => {
                remove(&mut self.material_instances, id)?;
            }
            Resource::ViewId(id) => {
                remove(&mut self.views, id)?;
            }
            Resource::SceneId(id) => {
                remove(&mut self.scenes, id)?;
            }
            Resource::SkyboxId(id) => {
                remove(&mut self.skyboxes, id)?;
            }
        }
        Ok(())
    }

    /// Every resource created and not destroyed yet.
    pub fn live_resources(&self) -> Vec<Resource> {
        let mut live: Vec<Resource> = Vec::new();
        live.extend(self.entities.iter().map(|&e| Resource::from(e)));
        live.extend(self.vertex_buffers.keys().map(|&id| Resource::from(id)));
        live.extend(self.index_buffers.keys().map(|&id| Resource::from(id)));
        live.extend(self.textures.keys().map(|&id| Resource::from(id)));
        live.extend(self.render_targets.keys().map(|&id| Resource::from(id)));
        live.extend(self.materials.keys().map(|&id| Resource::from(id)));
        live.extend(self.material_instances.keys().map(|&id| Resource::from(id)));
        live.extend(self.views.keys().map(|&id| Resource::from(id)));
        live.extend(self.scenes.keys().map(|&id| Resource::from(id)));
        live.extend(self.skyboxes.keys().map(|&id| Resource::from(id)));
        live
    }

    /// Tears the engine down, failing if anything created through it is still alive.
    pub fn shutdown(self) -> Result<(), EngineError> {
        let leaked = self.live_resources();
        if leaked.is_empty() {
            log::info!("engine shut down cleanly");
            Ok(())
        } else {
            for resource in &leaked {
                log::warn!("leaked {resource}");
            }
            Err(EngineError::Leaked { resources: leaked })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_across_kinds() {
        let mut engine = Engine::new(Backend::Vulkan);
        let e = engine.create_entity();
        let v = engine.create_view();
        let s = engine.create_scene();
        assert_ne!(e.id(), v.id());
        assert_ne!(v.id(), s.id());
        assert_eq!(engine.backend(), Backend::Vulkan);
        assert_eq!(engine.live_resources().len(), 3);
    }

    #[test]
    fn scenes_are_entity_sets() {
        let mut engine = Engine::default();
        let scene = engine.create_scene();
        let a = engine.create_entity();
        let b = engine.create_entity();

        engine.add_entity(scene, a).unwrap();
        engine.add_entity(scene, a).unwrap();
        engine.remove_entity(scene, b).unwrap();
        assert_eq!(engine.scene(scene).unwrap().entity_count(), 1);
        assert!(engine.scene(scene).unwrap().contains(a));

        engine.destroy(a).unwrap();
        assert!(!engine.scene(scene).unwrap().contains(a));
        assert_eq!(
            engine.add_entity(scene, a),
            Err(EngineError::UnknownResource {
                resource: Resource::Entity(a)
            })
        );
    }

    #[test]
    fn transforms_default_to_identity() {
        let mut engine = Engine::default();
        let e = engine.create_entity();
        assert_eq!(engine.transform(e), Mat4::IDENTITY);
        let t = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        engine.set_transform(e, t).unwrap();
        assert_eq!(engine.transform(e), t);
        engine.destroy(e).unwrap();
        assert!(engine.set_transform(e, t).is_err());
    }

    #[test]
    fn camera_component_must_go_first() {
        let mut engine = Engine::default();
        let e = engine.create_entity();
        engine.create_camera(e).unwrap();
        assert!(matches!(
            engine.create_camera(e),
            Err(EngineError::DuplicateComponent { .. })
        ));
        assert!(matches!(engine.destroy(e), Err(EngineError::InUse { .. })));
        engine.destroy_camera_component(e).unwrap();
        engine.destroy(e).unwrap();
        engine.shutdown().unwrap();
    }

    #[test]
    fn double_destroy_is_an_error() {
        let mut engine = Engine::default();
        let view = engine.create_view();
        engine.destroy(view).unwrap();
        assert_eq!(
            engine.destroy(view),
            Err(EngineError::UnknownResource {
                resource: Resource::ViewId(view)
            })
        );
    }

    #[test]
    fn shutdown_reports_leaks() {
        let mut engine = Engine::default();
        let scene = engine.create_scene();
        let entity = engine.create_entity();
        match engine.shutdown() {
            Err(EngineError::Leaked { resources }) => {
                assert_eq!(resources, vec![Resource::from(entity), Resource::from(scene)]);
            }
            other => panic!("expected a leak, got {other:?}"),
        }
    }

    #[test]
    fn view_wiring_is_checked() {
        let mut engine = Engine::default();
        let view = engine.create_view();
        let scene = engine.create_scene();
        let not_a_camera = engine.create_entity();

        assert!(matches!(
            engine.set_view_camera(view, not_a_camera),
            Err(EngineError::MissingComponent { .. })
        ));
        engine.set_view_scene(view, scene).unwrap();
        assert_eq!(engine.view(view).unwrap().scene(), Some(scene));
        engine.view_mut(view).unwrap().set_front_face_winding_inverted(true);
        assert!(engine.view(view).unwrap().front_face_winding_inverted());
    }
}
