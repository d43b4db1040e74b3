//! Frame driver: owns the engine, the main view and its camera, and calls a [Sample]
//! through setup, per-frame animation and cleanup.

use anyhow::Context;
use glam::{UVec2, Vec3};

use crate::{
    counter,
    engine::{Engine, Entity, RenderedView, Renderer, SceneId, ViewId, Viewport},
    utils::{counter::report_counters, timer::timed_scope_log},
};

pub use crate::engine::Backend;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub title: String,
    pub backend: Backend,
    pub dimensions: UVec2,
    pub frames: u32,
    /// Frames per second of simulated time.
    pub frame_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "showcase".to_owned(),
            backend: Backend::default(),
            dimensions: UVec2::new(1024, 640),
            frames: 120,
            frame_rate: 60.0,
        }
    }
}

/// Lens of the main camera, in millimeters.
pub const MAIN_CAMERA_FOCAL_LENGTH: f32 = 28.0;
pub const MAIN_CAMERA_HOME: Vec3 = Vec3::new(0.0, 0.0, 4.0);

/// Handed to [Sample::setup].
pub struct SetupContext<'a> {
    pub engine: &'a mut Engine,
    pub view: ViewId,
    pub scene: SceneId,
    offscreen_views: &'a mut Vec<ViewId>,
}

impl SetupContext<'_> {
    /// Registers a view rendered before the main view every frame.
    pub fn add_offscreen_view(&mut self, view: ViewId) {
        self.offscreen_views.push(view);
    }
}

pub trait Sample {
    fn setup(&mut self, ctx: &mut SetupContext<'_>) -> anyhow::Result<()>;

    fn animate(&mut self, _engine: &mut Engine, _view: ViewId, _now: f64) -> anyhow::Result<()> {
        Ok(())
    }

    fn pre_render(
        &mut self,
        _engine: &Engine,
        _view: ViewId,
        _scene: SceneId,
        _renderer: &mut Renderer,
    ) {
    }

    /// Destroys everything `setup` created. Views registered with
    /// [SetupContext::add_offscreen_view] are not rendered anymore afterwards.
    fn cleanup(&mut self, engine: &mut Engine, view: ViewId, scene: SceneId)
        -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub frames: u32,
    /// Views of the last frame, offscreen ones first.
    pub last_frame: Vec<RenderedView>,
}

/// A running application, between engine creation and [Session::finish].
pub struct Session {
    config: Config,
    engine: Engine,
    renderer: Renderer,
    view: ViewId,
    scene: SceneId,
    camera: Entity,
    offscreen_views: Vec<ViewId>,
    frame: u32,
}

impl Session {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        log::info!(
            "{}: {}x{} on {}",
            config.title,
            config.dimensions.x,
            config.dimensions.y,
            config.backend
        );
        let mut engine = Engine::new(config.backend);

        let scene = engine.create_scene();
        let view = engine.create_view();
        let camera = engine.create_entity();
        engine.create_camera(camera)?;

        let viewport = Viewport::new(0, 0, config.dimensions.x, config.dimensions.y);
        {
            let cam = engine.camera_mut(camera)?;
            cam.set_lens_projection(MAIN_CAMERA_FOCAL_LENGTH, viewport.aspect(), 0.1, 100.0);
            cam.look_at(MAIN_CAMERA_HOME, Vec3::ZERO, Vec3::Y);
        }
        engine.set_view_scene(view, scene)?;
        engine.set_view_camera(view, camera)?;
        {
            let v = engine.view_mut(view)?;
            v.set_viewport(viewport);
            v.set_name("main");
        }

        Ok(Self {
            config,
            engine,
            renderer: Renderer::default(),
            view,
            scene,
            camera,
            offscreen_views: Vec::new(),
            frame: 0,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn scene(&self) -> SceneId {
        self.scene
    }

    pub fn offscreen_views(&self) -> &[ViewId] {
        &self.offscreen_views
    }

    pub fn setup(&mut self, sample: &mut impl Sample) -> anyhow::Result<()> {
        let mut ctx = SetupContext {
            engine: &mut self.engine,
            view: self.view,
            scene: self.scene,
            offscreen_views: &mut self.offscreen_views,
        };
        timed_scope_log("setup", || sample.setup(&mut ctx))
            .res
            .context("sample setup failed")
    }

    /// Animates then renders every offscreen view followed by the main view.
    pub fn frame(&mut self, sample: &mut impl Sample) -> anyhow::Result<Vec<RenderedView>> {
        let now = f64::from(self.frame) / self.config.frame_rate;
        sample.animate(&mut self.engine, self.view, now)?;
        sample.pre_render(&self.engine, self.view, self.scene, &mut self.renderer);

        self.renderer.begin_frame();
        let rendered = self
            .offscreen_views
            .iter()
            .chain(std::iter::once(&self.view))
            .map(|&view| self.renderer.render(&self.engine, view))
            .collect::<Result<Vec<_>, _>>();
        self.renderer.end_frame();

        counter!("Frames");
        log::debug!("frame {} at t = {now:.3}s", self.frame);
        self.frame += 1;
        Ok(rendered?)
    }

    /// Runs the sample's cleanup, tears the session down and checks for leaks.
    pub fn finish(mut self, sample: &mut impl Sample) -> anyhow::Result<()> {
        sample
            .cleanup(&mut self.engine, self.view, self.scene)
            .context("sample cleanup failed")?;
        self.offscreen_views.clear();

        self.engine.destroy_camera_component(self.camera)?;
        self.engine.destroy(self.camera)?;
        self.engine.destroy(self.view)?;
        self.engine.destroy(self.scene)?;
        self.engine.shutdown()?;
        Ok(())
    }
}

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self, sample: &mut impl Sample) -> anyhow::Result<RunReport> {
        let mut session = Session::new(self.config.clone())?;
        session.setup(sample)?;

        let mut last_frame = Vec::new();
        for _ in 0..self.config.frames {
            last_frame = session.frame(sample)?;
        }

        session.finish(sample)?;
        report_counters();
        Ok(RunReport {
            frames: self.config.frames,
            last_frame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Empty {
        animated: Vec<f64>,
        extra: Option<Entity>,
    }

    impl Sample for Empty {
        fn setup(&mut self, ctx: &mut SetupContext<'_>) -> anyhow::Result<()> {
            let e = ctx.engine.create_entity();
            ctx.engine.add_entity(ctx.scene, e)?;
            self.extra = Some(e);
            Ok(())
        }

        fn animate(&mut self, _: &mut Engine, _: ViewId, now: f64) -> anyhow::Result<()> {
            self.animated.push(now);
            Ok(())
        }

        fn cleanup(&mut self, engine: &mut Engine, _: ViewId, _: SceneId) -> anyhow::Result<()> {
            if let Some(e) = self.extra.take() {
                engine.destroy(e)?;
            }
            Ok(())
        }
    }

    #[test]
    fn runs_frames_at_the_frame_rate() {
        let config = Config {
            frames: 3,
            frame_rate: 2.0,
            ..Default::default()
        };
        let mut sample = Empty::default();
        let report = App::new(config).run(&mut sample).unwrap();
        assert_eq!(sample.animated, vec![0.0, 0.5, 1.0]);
        assert_eq!(report.frames, 3);
        assert_eq!(report.last_frame.len(), 1);
        assert!(report.last_frame[0]
            .camera_model
            .w_axis
            .truncate()
            .abs_diff_eq(MAIN_CAMERA_HOME, 1e-6));
    }

    #[test]
    fn leaking_sample_fails_the_run() {
        struct Leaky;
        impl Sample for Leaky {
            fn setup(&mut self, ctx: &mut SetupContext<'_>) -> anyhow::Result<()> {
                ctx.engine.create_entity();
                Ok(())
            }
            fn cleanup(&mut self, _: &mut Engine, _: ViewId, _: SceneId) -> anyhow::Result<()> {
                Ok(())
            }
        }
        let config = Config {
            frames: 1,
            ..Default::default()
        };
        let err = App::new(config).run(&mut Leaky).unwrap_err();
        assert!(err.to_string().contains("never destroyed"));
    }
}
