//! The sample programs, as [Sample](crate::app::Sample) implementations.

pub mod mirror;
pub mod tangents;

pub use mirror::{MeshSource, MirrorSample, ReflectionMode};
pub use tangents::{SphereMaterial, TangentSphere};
