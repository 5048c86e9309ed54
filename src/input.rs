//! Keyboard and mouse routing to the orbit camera
//!
//! Key state is collected from window events and polled once per frame.
//! Mouse motion and scroll events act on the camera as they arrive. Cursor
//! positions only orbit until the first raw device motion event; a grabbed
//! cursor stops at the window edge, or never moves when locked.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::scene::{CameraMovement, OrbitCamera, ProjectionMode};

const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 6] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
    (KeyCode::KeyQ, CameraMovement::Up),
    (KeyCode::KeyE, CameraMovement::Down),
];

/// What a keyboard poll asked the application to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputActions {
    pub close_requested: bool,
    /// Set when P or O is held
    pub projection: Option<ProjectionMode>,
}

#[derive(Debug, Default)]
pub struct InputRouter {
    pressed: HashSet<KeyCode>,
    /// Cursor position of the previous move event
    last_cursor: Option<Vec2>,
    /// Set once raw device motion has been seen
    raw_motion: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed.insert(key);
            }
            ElementState::Released => {
                self.pressed.remove(&key);
            }
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Forget held keys, e.g. when the window loses focus
    pub fn release_all_keys(&mut self) {
        self.pressed.clear();
    }

    /// Orbit the camera by the cursor offset since the previous event.
    ///
    /// The first position only seeds the baseline. Screen Y grows downward,
    /// so the vertical offset is reversed.
    pub fn on_cursor_moved(&mut self, camera: &mut OrbitCamera, x: f64, y: f64) {
        if self.raw_motion {
            return;
        }
        let position = Vec2::new(x as f32, y as f32);
        let last = self.last_cursor.replace(position).unwrap_or(position);

        let dx = position.x - last.x;
        let dy = last.y - position.y;
        camera.rotate(dx, dy, true);
    }

    /// Orbit the camera by a raw mouse delta in pixels, Y reversed
    pub fn on_mouse_motion(&mut self, camera: &mut OrbitCamera, dx: f64, dy: f64) {
        self.raw_motion = true;
        camera.rotate(dx as f32, -dy as f32, true);
    }

    pub fn on_scroll(&mut self, camera: &mut OrbitCamera, dy: f32) {
        camera.zoom(dy);
    }

    /// Apply held keys to the camera for a frame of `dt` seconds
    pub fn poll(&self, camera: &mut OrbitCamera, dt: f32) -> InputActions {
        let mut actions = InputActions {
            close_requested: self.is_pressed(KeyCode::Escape),
            projection: None,
        };

        for (key, movement) in MOVEMENT_KEYS {
            if self.is_pressed(key) {
                camera.process_keyboard(movement, dt);
            }
        }

        if self.is_pressed(KeyCode::KeyP) {
            actions.projection = Some(ProjectionMode::Perspective);
        }
        if self.is_pressed(KeyCode::KeyO) {
            actions.projection = Some(ProjectionMode::Orthographic);
        }
        if let Some(mode) = actions.projection {
            camera.set_projection_mode(mode);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn first_cursor_event_only_seeds_baseline() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();

        router.on_cursor_moved(&mut camera, 500.0, 400.0);
        assert_eq!(camera.yaw(), -90.0);
        assert_eq!(camera.pitch(), 0.0);

        // Right and up on screen
        router.on_cursor_moved(&mut camera, 510.0, 380.0);
        assert!((camera.yaw() - -89.0).abs() < 1e-4);
        assert!((camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn raw_motion_orbits_without_cursor_bounds() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();

        // A locked cursor reports the same position forever
        router.on_cursor_moved(&mut camera, 500.0, 400.0);
        router.on_cursor_moved(&mut camera, 500.0, 400.0);
        assert_eq!(camera.yaw(), -90.0);

        // Raw deltas keep accumulating past any window edge
        for _ in 0..30 {
            router.on_mouse_motion(&mut camera, 100.0, 0.0);
        }
        assert!((camera.yaw() - 210.0).abs() < 1e-3);

        // Moving the mouse up gives a negative raw dy and raises the pitch
        router.on_mouse_motion(&mut camera, 0.0, -20.0);
        assert!((camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn cursor_positions_ignored_after_raw_motion() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();

        router.on_mouse_motion(&mut camera, 10.0, 0.0);
        let yaw = camera.yaw();

        // Both sources report the same movement; it must count once
        router.on_cursor_moved(&mut camera, 500.0, 400.0);
        router.on_cursor_moved(&mut camera, 510.0, 400.0);
        assert_eq!(camera.yaw(), yaw);
    }

    #[test]
    fn held_keys_pan_each_poll() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();

        router.on_key(KeyCode::KeyW, ElementState::Pressed);
        router.poll(&mut camera, 0.4);
        router.poll(&mut camera, 0.4);
        // speed 2.5 * 0.4 = 1 unit per poll along +Z
        assert!(camera.target().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));

        router.on_key(KeyCode::KeyW, ElementState::Released);
        router.poll(&mut camera, 0.4);
        assert!(camera.target().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();
        router.on_key(KeyCode::KeyQ, ElementState::Pressed);
        router.on_key(KeyCode::KeyE, ElementState::Pressed);
        router.poll(&mut camera, 1.0);
        assert!(camera.target().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn projection_and_close_keys() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();

        router.on_key(KeyCode::KeyO, ElementState::Pressed);
        let actions = router.poll(&mut camera, 0.016);
        assert_eq!(actions.projection, Some(ProjectionMode::Orthographic));
        assert_eq!(camera.projection_mode(), ProjectionMode::Orthographic);
        assert!(!actions.close_requested);

        router.release_all_keys();
        router.on_key(KeyCode::KeyP, ElementState::Pressed);
        router.on_key(KeyCode::Escape, ElementState::Pressed);
        let actions = router.poll(&mut camera, 0.016);
        assert_eq!(camera.projection_mode(), ProjectionMode::Perspective);
        assert!(actions.close_requested);
    }

    #[test]
    fn scroll_changes_speed() {
        let mut router = InputRouter::new();
        let mut camera = OrbitCamera::default();
        router.on_scroll(&mut camera, 5.0);
        assert!((camera.movement_speed() - 3.0).abs() < 1e-5);
    }
}
