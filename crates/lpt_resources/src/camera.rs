use glam::{Mat3, Mat4, Quat, Vec3};

use lpt_core::{DirtyFlags, Entity, EntityBase};

use crate::uniforms::CameraData;

/// Perspective camera.
///
/// Every setter rewrites the GPU record in place (position, rotation, clip
/// planes and the derived view/projection matrices) and raises
/// [`DirtyFlags::CAMERA`].
#[derive(Debug, Clone)]
pub struct Camera {
    base: EntityBase,
    data: CameraData,

    // Authoring state not carried by the record.
    direction: Vec3,
    up: Vec3,
    aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    #[must_use]
    pub fn new() -> Self {
        let mut camera = Self {
            base: EntityBase::new(Self::INITIAL_DIRTY),
            data: CameraData::default(),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            aspect: 1.0,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix();
        camera
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &CameraData {
        &self.data
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.data.position
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.data.rotation
    }

    /// Vertical field of view in degrees.
    #[must_use]
    pub fn fov(&self) -> f32 {
        self.data.fov
    }

    #[must_use]
    pub fn near(&self) -> f32 {
        self.data.near_plane
    }

    #[must_use]
    pub fn far(&self) -> f32 {
        self.data.far_plane
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.data.position = position;
        self.update_view_matrix();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    /// Orients the camera to look along `direction`, keeping `up` as close to
    /// vertical as possible. A degenerate basis keeps the previous rotation.
    pub fn set_direction(&mut self, direction: Vec3, up: Vec3) {
        let forward = direction.normalize_or_zero();
        let right = forward.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            log::warn!(
                "Camera '{}': degenerate direction {direction} / up {up}, rotation unchanged",
                self.name()
            );
        } else {
            let new_up = right.cross(forward);
            // Camera looks down -Z in its local frame.
            self.data.rotation = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward));
            self.direction = forward;
            self.up = new_up;
            self.update_view_matrix();
        }
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    /// Degrees.
    pub fn set_fov(&mut self, fov: f32) {
        self.data.fov = fov;
        self.update_projection_matrix();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    pub fn set_near(&mut self, near: f32) {
        self.data.near_plane = near;
        self.update_projection_matrix();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    pub fn set_far(&mut self, far: f32) {
        self.data.far_plane = far;
        self.update_projection_matrix();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    /// Width over height of the image the camera renders into.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
        self.mark_dirty(DirtyFlags::CAMERA);
    }

    fn update_view_matrix(&mut self) {
        // View = inverse of the camera's world transform.
        self.data.view =
            Mat4::from_rotation_translation(self.data.rotation, self.data.position).inverse();
    }

    fn update_projection_matrix(&mut self) {
        self.data.proj = Mat4::perspective_rh(
            self.data.fov.to_radians(),
            self.aspect,
            self.data.near_plane,
            self.data.far_plane,
        );
    }
}

impl Entity for Camera {
    const INITIAL_DIRTY: DirtyFlags = DirtyFlags::CAMERA;

    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn new_camera_is_dirty_and_sane() {
        let camera = Camera::new();
        assert!(camera.is_dirty(DirtyFlags::CAMERA));
        assert_eq!(camera.fov(), 60.0);
        assert_eq!(camera.data().view, Mat4::IDENTITY);
    }

    #[test]
    fn position_moves_view_matrix() {
        let mut camera = Camera::new();
        camera.clear_dirty();
        camera.set_position(Vec3::new(0.0, 0.0, 5.0));

        assert!(camera.is_dirty(DirtyFlags::CAMERA));
        let origin_in_view = camera.data().view.transform_point3(Vec3::ZERO);
        assert!(origin_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
    }

    #[test]
    fn direction_builds_orthonormal_rotation() {
        let mut camera = Camera::new();
        camera.set_direction(Vec3::X, Vec3::Y);

        let forward = camera.rotation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn degenerate_direction_keeps_rotation_but_marks_dirty() {
        init_logger();
        let mut camera = Camera::new();
        camera.clear_dirty();
        camera.set_direction(Vec3::Y, Vec3::Y);
        assert_eq!(camera.rotation(), Quat::IDENTITY);
        assert!(camera.is_dirty(DirtyFlags::CAMERA));
    }

    #[test]
    fn clip_changes_rebuild_projection() {
        let mut camera = Camera::new();
        let before = camera.data().proj;
        camera.set_fov(90.0);
        assert_ne!(camera.data().proj, before);
        camera.set_near(0.5);
        camera.set_far(500.0);
        assert_eq!(camera.near(), 0.5);
        assert_eq!(camera.far(), 500.0);
    }
}
