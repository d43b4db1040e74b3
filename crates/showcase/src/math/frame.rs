use glam::{Mat3, Quat, Vec3};

/// Represent an orthonormal, right-handed frame whose columns are
/// (bitangent, tangent, normal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    frame: Mat3,
}

impl Frame {
    /// Construct a Frame from a single vector using the algorithm described in
    /// “Building an Orthonormal Basis, Revisited (JCGT).” https://jcgt.org/published/0006/01/01/.
    /// n is expected to be normalized and will be used as the +z axis
    pub fn new(n: Vec3) -> Self {
        let sign = f32::signum(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        Self {
            frame: Mat3::from_cols(
                Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
                Vec3::new(b, sign + n.y * n.y * a, -n.y),
                n,
            ),
        }
    }

    pub fn bitangent(&self) -> Vec3 {
        self.frame.x_axis
    }

    pub fn tangent(&self) -> Vec3 {
        self.frame.y_axis
    }

    pub fn normal(&self) -> Vec3 {
        self.frame.z_axis
    }

    pub fn matrix(&self) -> Mat3 {
        self.frame
    }

    /// Encodes the frame as a unit quaternion with a non-negative `w`.
    pub fn to_quat(&self) -> Quat {
        let q = Quat::from_mat3(&self.frame).normalize();
        if q.w < 0.0 {
            -q
        } else {
            q
        }
    }
}

/// Reads `(normal, tangent)` back from a packed tangent frame: the third and second
/// columns of the rotation matrix.
pub fn tangent_frame_axes(q: Quat) -> (Vec3, Vec3) {
    let m = Mat3::from_quat(q);
    (m.z_axis, m.y_axis)
}
