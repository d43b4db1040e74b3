use std::collections::BTreeSet;

use glam::Vec4;

use super::{Engine, EngineError, Entity, RenderTargetId, SceneId, SkyboxId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// What to render (scene), from where (camera) and into what (render target or screen).
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub(super) scene: Option<SceneId>,
    pub(super) camera: Option<Entity>,
    pub(super) render_target: Option<RenderTargetId>,
    viewport: Viewport,
    post_processing: bool,
    front_face_winding_inverted: bool,
    name: Option<String>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            scene: None,
            camera: None,
            render_target: None,
            viewport: Viewport::default(),
            post_processing: true,
            front_face_winding_inverted: false,
            name: None,
        }
    }
}

impl View {
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    pub fn render_target(&self) -> Option<RenderTargetId> {
        self.render_target
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn post_processing_enabled(&self) -> bool {
        self.post_processing
    }

    pub fn set_post_processing_enabled(&mut self, enabled: bool) {
        self.post_processing = enabled;
    }

    /// Mirrored cameras turn counter-clockwise triangles clockwise; the view compensates
    /// by swapping which winding is considered front facing.
    pub fn front_face_winding_inverted(&self) -> bool {
        self.front_face_winding_inverted
    }

    pub fn set_front_face_winding_inverted(&mut self, inverted: bool) {
        self.front_face_winding_inverted = inverted;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub(super) entities: BTreeSet<Entity>,
    pub(super) skybox: Option<SkyboxId>,
}

impl Scene {
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn skybox(&self) -> Option<SkyboxId> {
        self.skybox
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skybox {
    pub color: Vec4,
}

impl Skybox {
    pub fn builder() -> SkyboxBuilder {
        SkyboxBuilder::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SkyboxBuilder {
    color: Vec4,
}

impl Default for SkyboxBuilder {
    fn default() -> Self {
        Self { color: Vec4::W }
    }
}

impl SkyboxBuilder {
    pub fn color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn build(self, engine: &mut Engine) -> Result<SkyboxId, EngineError> {
        if !self.color.is_finite() {
            return Err(EngineError::InvalidBuilder {
                what: "skybox",
                reason: format!("colour {} is not finite", self.color),
            });
        }
        let id = SkyboxId(engine.next_id());
        engine.skyboxes.insert(id, Skybox { color: self.color });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skybox_on_scene() {
        let mut engine = Engine::default();
        let scene = engine.create_scene();
        let skybox = Skybox::builder()
            .color(Vec4::new(0.1, 0.125, 0.25, 1.0))
            .build(&mut engine)
            .unwrap();
        engine.set_skybox(scene, Some(skybox)).unwrap();
        assert_eq!(engine.scene(scene).unwrap().skybox(), Some(skybox));
        assert_eq!(engine.skybox(skybox).unwrap().color.z, 0.25);

        engine.set_skybox(scene, None).unwrap();
        engine.destroy(skybox).unwrap();
        assert!(engine.set_skybox(scene, Some(skybox)).is_err());
    }

    #[test]
    fn view_defaults() {
        let view = View::default();
        assert!(view.post_processing_enabled());
        assert!(!view.front_face_winding_inverted());
        assert_eq!(Viewport::new(0, 0, 1024, 640).aspect(), 1.6);
    }
}
