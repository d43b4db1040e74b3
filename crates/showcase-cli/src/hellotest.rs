use clap::{Parser, ValueEnum};
use showcase::{
    samples::{SphereMaterial, TangentSphere},
    App,
};

use crate::CommonArgs;

#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum AvailableMaterial {
    #[default]
    BakedColor,
    SandboxLit,
}

impl From<AvailableMaterial> for SphereMaterial {
    fn from(val: AvailableMaterial) -> Self {
        match val {
            AvailableMaterial::BakedColor => SphereMaterial::BakedColor,
            AvailableMaterial::SandboxLit => SphereMaterial::SandboxLit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hellotest", about = "Icosphere coloured by its tangent frames")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, value_enum, default_value_t)]
    /// Material of the sphere
    pub material: AvailableMaterial,
}

pub fn run(args: &Args) -> anyhow::Result<()> {
    let mut sample = TangentSphere::new(args.material.into())?;
    let report = App::new(args.common.config("hellotest")).run(&mut sample)?;
    log::info!("ran {} frames", report.frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_material() {
        let args = Args::try_parse_from(["hellotest", "--material", "sandbox-lit", "-a", "vulkan"])
            .unwrap();
        assert_eq!(args.material, AvailableMaterial::SandboxLit);
        assert!(Args::try_parse_from(["hellotest", "--material", "chrome"]).is_err());
    }

    #[test]
    fn runs_a_few_frames() {
        let args = Args::try_parse_from(["hellotest", "--frames", "2", "-d", "320x200"]).unwrap();
        run(&args).unwrap();
    }
}
