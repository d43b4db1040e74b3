/// The colorspaces
///
/// Linear RGB is where lighting math happens. sRGB is the transfer format artists
/// pick colours in, so sample code writes sRGB values and converts them before handing
/// them to lights or materials.
pub trait Colorspace: Copy + Clone + Send + Sync + std::fmt::Debug {
    fn to_linear_rgb(c: f32) -> f32;
    fn from_linear_rgb(c: f32) -> f32;
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(non_camel_case_types)]
pub struct Linear_RGB;

impl Linear_RGB {
    pub fn from_srgb(srgb: f32) -> f32 {
        let srgb = srgb.clamp(0.0, 1.0);
        if srgb.is_nan() {
            0.0
        } else if srgb <= 0.04045 {
            srgb / 12.92
        } else {
            ((srgb + 0.055) / 1.055).powf(2.4)
        }
    }
}

impl Colorspace for Linear_RGB {
    fn to_linear_rgb(c: f32) -> f32 {
        c
    }

    fn from_linear_rgb(c: f32) -> f32 {
        c
    }
}

/// YOU CAN'T DO MATH ON sRGB USE LINEAR RGB
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(non_camel_case_types)]
pub struct sRGB;

impl sRGB {
    pub fn from_linear(linear: f32) -> f32 {
        let linear = linear.clamp(0.0, 1.0);
        if linear.is_nan() {
            0.0
        } else if linear < 0.0031308 {
            12.92 * linear
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        }
    }
}

impl Colorspace for sRGB {
    fn to_linear_rgb(c: f32) -> f32 {
        Linear_RGB::from_srgb(c)
    }

    fn from_linear_rgb(c: f32) -> f32 {
        Self::from_linear(c)
    }
}
