use glam::{Mat4, Quat, Vec3};

/// Represents a transformation as translation + scale + rot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: Vec3,
    pub rot: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        scale: Vec3::ONE,
        rot: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rot: Quat) -> Self {
        Self {
            rot,
            ..Self::IDENTITY
        }
    }

    pub fn into_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rot, self.translation)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.into_matrix()
    }
}
