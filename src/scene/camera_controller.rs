//! Orbit camera controller
//!
//! The camera looks at a target point from a fixed distance. Its position is
//! placed on a sphere around the target by yaw and pitch (degrees):
//!
//! ```text
//! position = target + distance * (cos(yaw) cos(pitch), sin(pitch), sin(yaw) cos(pitch))
//! ```
//!
//! - WASD: Pan the target forward/backward/left/right
//! - QE: Pan the target up/down
//! - Mouse: Orbit around the target
//! - Scroll: Adjust movement speed

use glam::{Mat4, Vec3};

use super::{Projection, ProjectionMode};
use crate::backend::traits::ShaderUniforms;
use crate::backend::types::uniforms;

pub const MIN_MOVEMENT_SPEED: f32 = 1.0;
pub const MAX_MOVEMENT_SPEED: f32 = 10.0;
/// Speed change per scroll unit
pub const SCROLL_SPEED_STEP: f32 = 0.1;
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Direction to pan the camera target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Orbit camera around a movable target.
///
/// `position`, `front`, `right` and `up` are derived from the target, angles
/// and distance, and are recomputed together after every mutation.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    /// Horizontal angle in degrees
    yaw: f32,
    /// Vertical angle in degrees
    pitch: f32,
    distance: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    world_up: Vec3,
    projection_mode: ProjectionMode,
    aspect: f32,

    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, -90.0, 0.0, 10.0)
    }
}

impl OrbitCamera {
    pub fn new(target: Vec3, yaw_degrees: f32, pitch_degrees: f32, distance: f32) -> Self {
        let mut camera = Self {
            target,
            yaw: yaw_degrees,
            pitch: pitch_degrees,
            distance: distance.max(f32::EPSILON),
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            world_up: Vec3::Y,
            projection_mode: ProjectionMode::Perspective,
            aspect: 1000.0 / 800.0,
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    /// Set the movement speed, clamped to the scroll range
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed.clamp(MIN_MOVEMENT_SPEED, MAX_MOVEMENT_SPEED);
        self
    }

    /// Set the mouse sensitivity (degrees per pixel)
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.set_aspect(aspect);
        self
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let offset = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());

        self.position = self.target + self.distance * offset;
        self.front = (self.target - self.position).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Move the target along the camera axes by `velocity` world units
    pub fn pan(&mut self, direction: CameraMovement, velocity: f32) {
        match direction {
            CameraMovement::Forward => self.target += self.front * velocity,
            CameraMovement::Backward => self.target -= self.front * velocity,
            CameraMovement::Left => self.target -= self.right * velocity,
            CameraMovement::Right => self.target += self.right * velocity,
            CameraMovement::Up => self.target += self.up * velocity,
            CameraMovement::Down => self.target -= self.up * velocity,
        }
        self.update_vectors();
    }

    /// Pan for one frame of held key at the current movement speed
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        self.pan(direction, self.movement_speed * dt);
    }

    /// Orbit by mouse offsets in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch += dy * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        }

        self.update_vectors();
    }

    /// Adjust movement speed from the scroll wheel.
    ///
    /// Distance and field of view are left untouched.
    pub fn zoom(&mut self, scroll: f32) {
        self.movement_speed = (self.movement_speed + scroll * SCROLL_SPEED_STEP)
            .clamp(MIN_MOVEMENT_SPEED, MAX_MOVEMENT_SPEED);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, mode: ProjectionMode) -> Mat4 {
        Projection::for_mode(mode, self.aspect).matrix()
    }

    /// Projection matrix for the active mode
    pub fn current_projection(&self) -> Mat4 {
        self.projection_matrix(self.projection_mode)
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        if self.projection_mode != mode {
            log::debug!("Projection mode: {:?}", mode);
        }
        self.projection_mode = mode;
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Push `view`, `projection` and `viewPosition`
    pub fn apply(&self, shader: &mut dyn ShaderUniforms) {
        shader.set_mat4(uniforms::VIEW, self.view_matrix());
        shader.set_mat4(uniforms::PROJECTION, self.current_projection());
        shader.set_vec3(uniforms::VIEW_POSITION, self.position);
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, UniformValue};
    use crate::backend::GraphicsBackend;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(camera: &OrbitCamera) {
        for v in [camera.front(), camera.right(), camera.up()] {
            assert!((v.length() - 1.0).abs() < EPS);
        }
        assert!(camera.front().dot(camera.right()).abs() < EPS);
        assert!(camera.front().dot(camera.up()).abs() < EPS);
        assert!(camera.right().dot(camera.up()).abs() < EPS);
    }

    #[test]
    fn default_position_follows_spherical_formula() {
        // cos(-90) = 0 and sin(-90) = -1 put the camera on -Z
        let camera = OrbitCamera::default();
        assert!(camera.position().abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-4));
        assert!(camera.front().abs_diff_eq(Vec3::Z, EPS));
        assert_orthonormal(&camera);
    }

    #[test]
    fn derivation_is_deterministic() {
        let target = Vec3::new(1.0, -2.0, 3.0);
        for yaw in [-270.0, -90.0, 0.0, 33.3, 180.0] {
            for pitch in [-89.0, -45.0, 0.0, 12.5, 89.0] {
                let a = OrbitCamera::new(target, yaw, pitch, 7.5);
                let b = OrbitCamera::new(target, yaw, pitch, 7.5);
                assert_eq!(a.position(), b.position());
                assert_eq!(a.front(), b.front());
                assert_eq!(a.right(), b.right());
                assert_eq!(a.up(), b.up());
                assert_orthonormal(&a);
                assert!(((a.position() - target).length() - 7.5).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn pitch_stays_clamped() {
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera.rotate(3.0, 250.0, true);
        }
        assert_eq!(camera.pitch(), 89.0);
        for _ in 0..100 {
            camera.rotate(-1.0, -1000.0, true);
        }
        assert_eq!(camera.pitch(), -89.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn unconstrained_rotate_leaves_pitch_free() {
        let mut camera = OrbitCamera::default();
        camera.rotate(0.0, 1000.0, false);
        assert!((camera.pitch() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn rotate_scales_by_sensitivity() {
        let mut camera = OrbitCamera::default();
        camera.rotate(100.0, 50.0, true);
        assert!((camera.yaw() - -80.0).abs() < 1e-4);
        assert!((camera.pitch() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_adjusts_speed_within_range() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1.0);
        assert!((camera.movement_speed() - 2.6).abs() < 1e-5);
        assert_eq!(camera.distance(), 10.0);

        for _ in 0..500 {
            camera.zoom(3.0);
        }
        assert_eq!(camera.movement_speed(), MAX_MOVEMENT_SPEED);
        for _ in 0..500 {
            camera.zoom(-7.0);
        }
        assert_eq!(camera.movement_speed(), MIN_MOVEMENT_SPEED);
    }

    #[test]
    fn pan_moves_target_and_keeps_offset() {
        let mut camera = OrbitCamera::default();
        let offset = camera.position() - camera.target();

        camera.pan(CameraMovement::Forward, 2.0);
        assert!(camera.target().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPS));
        camera.pan(CameraMovement::Right, 1.0);
        assert!(camera.target().abs_diff_eq(camera.right() + Vec3::new(0.0, 0.0, 2.0), EPS));
        camera.pan(CameraMovement::Up, 0.5);
        assert!((camera.target().y - 0.5).abs() < EPS);

        assert!((camera.position() - camera.target()).abs_diff_eq(offset, 1e-4));
    }

    #[test]
    fn keyboard_velocity_uses_speed_and_delta_time() {
        let mut camera = OrbitCamera::default().with_speed(4.0);
        camera.process_keyboard(CameraMovement::Backward, 0.5);
        assert!(camera.target().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPS));
        camera.process_keyboard(CameraMovement::Down, 0.25);
        assert!((camera.target().y + 1.0).abs() < EPS);
    }

    #[test]
    fn view_matrix_maps_target_in_front() {
        let camera = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 30.0, 20.0, 5.0);
        let target_in_view = camera.view_matrix().transform_point3(camera.target());
        assert!(target_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-4));
    }

    #[test]
    fn apply_pushes_active_projection() {
        let mut camera = OrbitCamera::default();
        camera.set_projection_mode(ProjectionMode::Orthographic);
        let mut backend = HeadlessBackend::default();
        camera.apply(backend.shader().unwrap());

        let pushed: Vec<_> = backend.uniforms().collect();
        assert_eq!(pushed.len(), 3);
        assert_eq!(pushed[0].0, "view");
        assert_eq!(
            pushed[1],
            (
                "projection",
                &UniformValue::Mat4(camera.projection_matrix(ProjectionMode::Orthographic))
            )
        );
        assert_eq!(pushed[2], ("viewPosition", &UniformValue::Vec3(camera.position())));
    }
}
