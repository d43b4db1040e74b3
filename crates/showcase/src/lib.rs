pub mod app;
pub mod color;
pub mod engine;
pub mod geometry;
pub mod loader;
pub mod math;
pub mod resources;
pub mod samples;
pub mod utils;

pub use app::{App, Config, Sample};
