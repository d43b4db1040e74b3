use glam::{Quat, Vec2, Vec3};

use crate::{color::pack_tangent_color, math::tangent_frame_axes};

/// Position, visualisation colour and tangent frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TangentVertex {
    pub position: [f32; 3],
    /// RGBA8, little endian
    pub color: u32,
    pub tangents: [f32; 4],
}

impl TangentVertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    pub const COLOR_OFFSET: usize = 12;
    pub const TANGENTS_OFFSET: usize = 16;

    /// Builds a vertex whose colour visualises the tangent of its frame.
    pub fn with_tangent_color(position: Vec3, tangents: Quat) -> Self {
        let (_normal, tangent) = tangent_frame_axes(tangents);
        Self {
            position: position.to_array(),
            color: pack_tangent_color(tangent),
            tangents: tangents.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UvVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl UvVertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    pub const UV_OFFSET: usize = 12;

    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tangents: [f32; 4],
}

impl MeshVertex {
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    pub const TANGENTS_OFFSET: usize = 12;

    pub fn new(position: Vec3, tangents: Quat) -> Self {
        Self {
            position: position.to_array(),
            tangents: tangents.to_array(),
        }
    }
}

const _: () = assert!(TangentVertex::STRIDE == 32, "Strange vertex size.");
const _: () = assert!(UvVertex::STRIDE == 20, "Strange vertex size.");
const _: () = assert!(MeshVertex::STRIDE == 28, "Strange vertex size.");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Frame;

    #[test]
    fn field_offsets_match_layout() {
        let v = TangentVertex {
            position: [1.0, 2.0, 3.0],
            color: 0xdead_beef,
            tangents: [4.0, 5.0, 6.0, 7.0],
        };
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[TangentVertex::COLOR_OFFSET..][..4], &0xdead_beef_u32.to_ne_bytes());
        let w: f32 = bytemuck::pod_read_unaligned(&bytes[TangentVertex::TANGENTS_OFFSET + 12..][..4]);
        assert_eq!(w, 7.0);

        let uv = UvVertex::new(Vec3::ZERO, Vec2::new(0.25, 0.75));
        let u: f32 = bytemuck::pod_read_unaligned(&bytemuck::bytes_of(&uv)[UvVertex::UV_OFFSET..][..4]);
        assert_eq!(u, 0.25);
    }

    #[test]
    fn color_follows_tangent() {
        let frame = Frame::new(Vec3::Z);
        // the +Z frame has its tangent along +Y
        let v = TangentVertex::with_tangent_color(Vec3::ONE, frame.to_quat());
        assert_eq!(v.color.to_le_bytes(), [127, 255, 127, 255]);
        assert_eq!(v.position, [1.0; 3]);
    }
}
