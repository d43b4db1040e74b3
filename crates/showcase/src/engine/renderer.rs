use glam::{Mat4, Vec4};

use crate::counter;

use super::{Engine, EngineError, Entity, RenderTargetId, Resource, ViewId};

/// How the target is prepared before a view is drawn into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOptions {
    pub clear_color: Vec4,
    pub clear: bool,
    /// Previous content may be dropped instead of loaded.
    pub discard: bool,
}

impl Default for ClearOptions {
    fn default() -> Self {
        Self {
            clear_color: Vec4::ZERO,
            clear: false,
            discard: true,
        }
    }
}

/// What rendering a view amounted to.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub view: ViewId,
    pub render_target: Option<RenderTargetId>,
    pub camera_model: Mat4,
    pub view_projection: Mat4,
    pub front_face_winding_inverted: bool,
    pub clear: ClearOptions,
    /// Renderable entities of the scene, in handle order.
    pub renderables: Vec<Entity>,
    pub lights: usize,
}

#[derive(Debug, Default)]
pub struct Renderer {
    clear_options: ClearOptions,
    frame: u64,
    in_frame: bool,
}

impl Renderer {
    pub fn clear_options(&self) -> ClearOptions {
        self.clear_options
    }

    pub fn set_clear_options(&mut self, options: ClearOptions) {
        self.clear_options = options;
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    pub fn begin_frame(&mut self) {
        self.in_frame = true;
    }

    pub fn end_frame(&mut self) {
        self.in_frame = false;
        self.frame += 1;
    }

    pub fn render(&mut self, engine: &Engine, view: ViewId) -> Result<RenderedView, EngineError> {
        if !self.in_frame {
            crate::warn_once!("rendering outside of begin_frame/end_frame");
        }

        let desc = engine.view(view)?;
        let unset = |component: &'static str| EngineError::InvalidBuilder {
            what: "view",
            reason: format!("{} has no {component}", Resource::from(view)),
        };
        let scene = engine.scene(desc.scene().ok_or_else(|| unset("scene"))?)?;
        let camera_entity = desc.camera().ok_or_else(|| unset("camera"))?;
        let camera = engine.camera(camera_entity)?;

        let renderables: Vec<Entity> = scene
            .entities()
            .filter(|&e| engine.renderable(e).is_ok())
            .collect();
        let lights = scene.entities().filter(|&e| engine.light(e).is_ok()).count();

        counter!("Views rendered");
        counter!("Renderables drawn", renderables.len() as u64);
        log::trace!(
            "frame {}: {} draws {} renderable(s), {} light(s)",
            self.frame,
            Resource::from(view),
            renderables.len(),
            lights
        );

        Ok(RenderedView {
            view,
            render_target: desc.render_target(),
            camera_model: camera.model_matrix(),
            view_projection: camera.projection_matrix() * camera.view_matrix(),
            front_face_winding_inverted: desc.front_face_winding_inverted(),
            clear: self.clear_options,
            renderables,
            lights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LightBuilder, LightType};

    #[test]
    fn renders_what_the_scene_holds() {
        let mut engine = Engine::default();
        let view = engine.create_view();
        let scene = engine.create_scene();
        let camera = engine.create_entity();
        engine.create_camera(camera).unwrap();

        let mut renderer = Renderer::default();
        assert!(renderer.render(&engine, view).is_err());

        engine.set_view_scene(view, scene).unwrap();
        engine.set_view_camera(view, camera).unwrap();
        let sun = engine.create_entity();
        LightBuilder::new(LightType::Sun).build(&mut engine, sun).unwrap();
        engine.add_entity(scene, sun).unwrap();
        let bare = engine.create_entity();
        engine.add_entity(scene, bare).unwrap();

        renderer.set_clear_options(ClearOptions {
            clear_color: Vec4::new(0.1, 0.2, 0.4, 1.0),
            clear: false,
            discard: false,
        });
        renderer.begin_frame();
        let frame = renderer.render(&engine, view).unwrap();
        renderer.end_frame();

        assert_eq!(frame.lights, 1);
        assert!(frame.renderables.is_empty());
        assert!(!frame.clear.discard);
        assert_eq!(renderer.frame_index(), 1);
    }
}
