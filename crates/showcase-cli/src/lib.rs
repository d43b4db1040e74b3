//! Command line front-ends of the showcase samples.

pub mod hellotest;
pub mod rendertarget;
pub mod utils;

use clap::{Args, Parser};
use showcase::app::Config;

pub use utils::{Api, Dimensions};

/// Options shared by every sample.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CommonArgs {
    #[arg(short, long, value_enum, default_value_t)]
    /// Backend API
    pub api: Api,

    #[arg(long, default_value_t = 120)]
    /// Number of frames to run before exiting
    pub frames: u32,

    #[arg(short, long, default_value = "1024x640")]
    /// Window dimension in format `width`x`height`
    pub dimensions: Dimensions,
}

impl CommonArgs {
    pub fn config(&self, title: &str) -> Config {
        Config {
            title: title.to_owned(),
            backend: self.api.into(),
            dimensions: self.dimensions.into(),
            frames: self.frames,
            ..Default::default()
        }
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Status the process ends with after a parse error: 0 for `--help`/`--version`,
/// 1 for anything wrong with the command line.
pub fn exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Parses the command line, printing help or the diagnostic and exiting on failure.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(exit_code(&err))
        }
    }
}
