use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use showcase::{
    samples::{MeshSource, MirrorSample, ReflectionMode},
    App,
};

use crate::CommonArgs;

#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Mode {
    #[default]
    /// Mirror the offscreen camera
    Camera,
    /// Draw a mirrored copy of the mesh
    Renderables,
}

impl From<Mode> for ReflectionMode {
    fn from(val: Mode) -> Self {
        match val {
            Mode::Camera => ReflectionMode::Camera,
            Mode::Renderables => ReflectionMode::Renderables,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rendertarget", about = "A mesh reflected in planar mirrors")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(short, long, value_enum, default_value_t)]
    /// Reflection technique
    pub mode: Mode,

    #[arg(long)]
    /// OBJ file to reflect; an icosphere when omitted
    pub mesh: Option<PathBuf>,
}

impl Args {
    pub fn mesh_source(&self) -> MeshSource {
        match &self.mesh {
            Some(path) => MeshSource::Obj(path.clone()),
            None => MeshSource::default(),
        }
    }
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let mut sample = MirrorSample::new(args.mode.into(), args.mesh_source());
    let report = App::new(args.common.config("rendertarget")).run(&mut sample)?;
    log::info!("ran {} frames", report.frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_code;

    #[test]
    fn parse_mode_and_api() {
        let args = Args::try_parse_from(["rendertarget", "-m", "renderables", "-a", "metal"])
            .unwrap();
        assert_eq!(args.mode, Mode::Renderables);
        assert_eq!(args.mesh_source(), MeshSource::default());

        let args = Args::try_parse_from(["rendertarget", "--mesh", "monkey.obj"]).unwrap();
        assert_eq!(args.mode, Mode::Camera);
        assert_eq!(args.mesh_source(), MeshSource::Obj("monkey.obj".into()));
    }

    #[test]
    fn bad_values_exit_with_one() {
        for argv in [
            &["rendertarget", "-m", "mirror"][..],
            &["rendertarget", "--api", "glide"][..],
            &["rendertarget", "-x"][..],
        ] {
            let err = Args::try_parse_from(argv).unwrap_err();
            assert_eq!(exit_code(&err), 1, "{argv:?}");
        }
        let help = Args::try_parse_from(["rendertarget", "-h"]).unwrap_err();
        assert_eq!(exit_code(&help), 0);
    }

    #[test]
    fn runs_a_few_frames() {
        let args = Args::try_parse_from(["rendertarget", "--frames", "3", "-m", "renderables"])
            .unwrap();
        run(&args).unwrap();
    }
}
