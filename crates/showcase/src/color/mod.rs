use std::marker::PhantomData;

use glam::Vec3;

pub mod colorspace;

use colorspace::Colorspace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color<S: Colorspace>(pub [f32; 3], PhantomData<S>);

#[allow(non_camel_case_types)]
pub type sRgb = Color<colorspace::sRGB>;
pub type Rgb = Color<colorspace::Linear_RGB>;

impl<S: Colorspace> Color<S> {
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self(arr, PhantomData)
    }

    pub const fn to_array(self) -> [f32; 3] {
        self.0
    }

    pub fn vec(self) -> Vec3 {
        Vec3::from_array(self.0)
    }

    pub fn convert<T: Colorspace>(self) -> Color<T> {
        Color::from_array(self.0.map(|c| T::from_linear_rgb(S::to_linear_rgb(c))))
    }

    pub fn to_linear(self) -> Rgb {
        self.convert()
    }
}

impl<S: Colorspace> From<[f32; 3]> for Color<S> {
    fn from(val: [f32; 3]) -> Self {
        Color::from_array(val)
    }
}

/// Maps a unit vector to an opaque RGBA8 colour packed little endian
/// (`0xAABBGGRR`): each component goes from [-1, 1] to [0, 255], scaled before
/// truncation.
pub fn pack_tangent_color(v: Vec3) -> u32 {
    let channel = |c: f32| ((c + 1.0) / 2.0 * 255.0).clamp(0.0, 255.0) as u32;
    0xff00_0000 | channel(v.x) | channel(v.y) << 8 | channel(v.z) << 16
}

pub mod linear {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb::from_array([1.0, 1.0, 1.0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_extremes() {
        assert_eq!(pack_tangent_color(Vec3::splat(-1.0)), 0xff00_0000);
        assert_eq!(pack_tangent_color(Vec3::splat(1.0)), 0xffff_ffff);
    }

    #[test]
    fn packing_truncates_after_scaling() {
        // 0 maps to 127.5, truncated to 127 in every channel
        assert_eq!(pack_tangent_color(Vec3::ZERO), 0xff7f_7f7f);
        assert_eq!(pack_tangent_color(Vec3::X).to_le_bytes(), [255, 127, 127, 255]);
        assert_eq!(pack_tangent_color(Vec3::NEG_Y).to_le_bytes(), [127, 0, 127, 255]);
        assert_eq!(pack_tangent_color(Vec3::Z).to_le_bytes(), [127, 127, 255, 255]);
        // just below the top of the range truncates to 254
        assert_eq!(pack_tangent_color(Vec3::splat(0.996)).to_le_bytes()[0], 254);
    }

    #[test]
    fn packing_clamps_out_of_range() {
        assert_eq!(pack_tangent_color(Vec3::new(2.0, -3.0, 1.5)), 0xffff_00ff);
        assert_eq!(pack_tangent_color(Vec3::new(f32::NAN, -1.0, -1.0)), 0xff00_0000);
    }

    #[test]
    fn srgb_to_linear() {
        let c = sRgb::from_array([0.0, 0.5, 1.0]).to_linear().to_array();
        assert_eq!(c[0], 0.0);
        assert!((c[1] - 0.214_041).abs() < 1e-4);
        assert!((c[2] - 1.0).abs() < 1e-6);

        let back: sRgb = Rgb::from_array(c).convert();
        assert!((back.to_array()[1] - 0.5).abs() < 1e-4);
    }
}
