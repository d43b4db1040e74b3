use glam::{Mat4, Vec3};

/// Camera component: a model matrix placing the camera in the world and the projections
/// used to render and to cull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    model: Mat4,
    projection: Mat4,
    culling_projection: Mat4,
    near: f32,
    culling_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            model: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            culling_projection: Mat4::IDENTITY,
            near: 0.1,
            culling_far: 100.0,
        };
        camera.set_projection(90.0, 1.0, 0.1, 100.0);
        camera
    }
}

impl Camera {
    /// Height of the reference sensor, in meters.
    pub const SENSOR_HEIGHT: f32 = 0.024;

    /// Vertical field of view in radians of a lens of `focal_length` millimeters on the
    /// reference sensor.
    pub fn fov_for_focal_length(focal_length: f32) -> f32 {
        2.0 * (0.5 * Self::SENSOR_HEIGHT / (focal_length * 1e-3)).atan()
    }

    /// `fov_y` in degrees. Renders with an infinite far plane, culls at `far`.
    pub fn set_projection(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.set_perspective(fov_y.to_radians(), aspect, near, far);
    }

    pub fn set_lens_projection(&mut self, focal_length: f32, aspect: f32, near: f32, far: f32) {
        self.set_perspective(Self::fov_for_focal_length(focal_length), aspect, near, far);
    }

    fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_infinite_rh(fov_y, aspect, near);
        self.culling_projection = Mat4::perspective_rh(fov_y, aspect, near, far);
        self.near = near;
        self.culling_far = far;
    }

    pub fn set_custom_projection(
        &mut self,
        projection: Mat4,
        culling_projection: Mat4,
        near: f32,
        culling_far: f32,
    ) {
        self.projection = projection;
        self.culling_projection = culling_projection;
        self.near = near;
        self.culling_far = culling_far;
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.model = Mat4::look_at_rh(eye, center, up).inverse();
    }

    pub fn set_model_matrix(&mut self, model: Mat4) {
        self.model = model;
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.model.inverse()
    }

    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn culling_projection_matrix(&self) -> Mat4 {
        self.culling_projection
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn culling_far(&self) -> f32 {
        self.culling_far
    }
}
