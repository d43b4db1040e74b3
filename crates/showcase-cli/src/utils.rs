use core::fmt::Display;

use clap::ValueEnum;
use glam::UVec2;
use showcase::app::Backend;

#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Api {
    #[default]
    Opengl,
    Vulkan,
    Metal,
}

impl From<Api> for Backend {
    fn from(val: Api) -> Self {
        match val {
            Api::Opengl => Backend::OpenGl,
            Api::Vulkan => Backend::Vulkan,
            Api::Metal => Backend::Metal,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for UVec2 {
    fn from(val: Dimensions) -> Self {
        UVec2::new(val.width, val.height)
    }
}

impl std::str::FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split_it = s.split('x');
        let (Some(a), Some(b), None) = (split_it.next(), split_it.next(), split_it.next()) else {
            return Err(anyhow::anyhow!("Incorrect format, expected `width`x`height`"));
        };
        let width: u32 = a.parse()?;
        let height: u32 = b.parse()?;
        anyhow::ensure!(width > 0 && height > 0, "Dimensions must be non zero");

        Ok(Dimensions { width, height })
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}x{}", self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dimensions() {
        let d: Dimensions = "1024x640".parse().unwrap();
        assert_eq!(d, Dimensions { width: 1024, height: 640 });
        assert_eq!(d.to_string(), "1024x640");

        for bad in ["1024", "1024x", "x640", "0x10", "1x2x3", "-1x2"] {
            assert!(bad.parse::<Dimensions>().is_err(), "{bad}");
        }
    }
}
