pub mod float;
pub mod frame;
pub mod plane;
pub mod transform;

pub use frame::{tangent_frame_axes, Frame};
pub use plane::{reflection_matrix, Plane};
pub use transform::Transform;
