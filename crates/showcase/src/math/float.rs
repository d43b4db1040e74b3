use glam::Vec3;

pub trait FloatAsExt {
    /// Returns `Some(f)` if f is far enough from zero (further than eps), else returns None
    ///
    /// Returns None for NaN and Some(f) for +/- infty
    fn into_non_zero(self, eps: Self) -> Option<f32>;

    /// Returns `Some(f)` if f is finite else returns None
    fn into_finite(self) -> Option<f32>;
}

impl FloatAsExt for f32 {
    fn into_non_zero(self, eps: Self) -> Option<f32> {
        (self.abs() > eps).then_some(self)
    }

    fn into_finite(self) -> Option<f32> {
        self.is_finite().then_some(self)
    }
}

pub trait Vec3AsNonZero: Sized {
    /// Returns `Some(v)` if the length of v is greater than eps
    fn into_non_zero(self, eps: f32) -> Option<Self>;
}

impl Vec3AsNonZero for Vec3 {
    fn into_non_zero(self, eps: f32) -> Option<Self> {
        self.length_squared().into_non_zero(eps * eps).and(Some(self))
    }
}
