//! Interaction state of the viewport: camera, incident ray and lobe yaw
//!
//! Kept free of GL so every key and mouse rule can be exercised with plain
//! input snapshots.

use app::{FrameInput, KeyCode};
use glam::Vec3;
use renderer::camera::TOP_DOWN_PITCH;
use renderer::Camera;

/// Scale applied to the per-frame camera increment
pub const CAMERA_POS_STEP: f32 = 0.05;
/// Camera increment from the arrow keys, before scaling
pub const ZOOM_KEY_STEP: f32 = 0.5;
/// Degrees of yaw per frame from the arrow keys
pub const LOBE_ROTATION_STEP: f32 = 0.5;
/// Incident ray component change per frame
pub const INCIDENT_STEP: f32 = 0.05;

/// Camera pose used by the top-down view
const TOP_VIEW_POSITION: Vec3 = Vec3::new(0.0, 0.5, 0.0);
const TOP_VIEW_ROTATION: Vec3 = Vec3::new(TOP_DOWN_PITCH, 0.0, 0.0);

/// What the last frame of input changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Changes {
    /// The incident direction moved; lobe and ray need resampling
    pub incident_ray: bool,
    /// The lobe yaw moved
    pub lobe_rotation: bool,
    /// Switched between the back and top views
    pub view_toggled: bool,
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    pub camera: Camera,
    incident: Vec3,
    lobe_yaw: f32,
    /// Camera pose to restore when leaving the top view
    saved_camera: Option<Camera>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            incident: Vec3::new(1.0, 1.0, 0.0).normalize(),
            lobe_yaw: 0.0,
            saved_camera: None,
        }
    }
}

impl ViewerState {
    /// Unit incident direction
    pub fn incident(&self) -> Vec3 {
        self.incident.normalize_or(Vec3::Y)
    }

    /// Yaw in degrees shared by the lobe and the incident ray
    pub fn lobe_yaw(&self) -> f32 {
        self.lobe_yaw
    }

    pub fn is_top_view(&self) -> bool {
        self.saved_camera.is_some()
    }

    /// Switch between the back view and the top-down view
    pub fn toggle_top_view(&mut self) {
        match self.saved_camera.take() {
            Some(saved) => self.camera = saved,
            None => {
                self.saved_camera = Some(self.camera);
                self.camera = Camera::new(TOP_VIEW_POSITION, TOP_VIEW_ROTATION);
            }
        }
    }

    /// Apply one frame of input
    ///
    /// Keys are checked in priority order and at most one key action runs per
    /// frame. Mouse dragging is independent of the keys.
    pub fn handle_input(&mut self, input: &FrameInput<'_>) -> Changes {
        let mut changes = Changes::default();
        let mut camera_inc = Vec3::ZERO;

        if input.is_key_held(KeyCode::ArrowUp) {
            self.push_camera(&mut camera_inc, -ZOOM_KEY_STEP);
        } else if input.is_key_held(KeyCode::ArrowDown) {
            self.push_camera(&mut camera_inc, ZOOM_KEY_STEP);
        } else if input.is_key_held(KeyCode::ArrowLeft) {
            self.lobe_yaw -= LOBE_ROTATION_STEP;
            changes.lobe_rotation = true;
        } else if input.is_key_held(KeyCode::ArrowRight) {
            self.lobe_yaw += LOBE_ROTATION_STEP;
            changes.lobe_rotation = true;
        } else if input.key_pressed_once(KeyCode::ShiftRight) {
            self.toggle_top_view();
            changes.view_toggled = true;
        } else if input.is_key_held(KeyCode::KeyA) {
            self.step_incident(Vec3::new(-INCIDENT_STEP, 0.0, 0.0));
            changes.incident_ray = true;
        } else if input.is_key_held(KeyCode::KeyD) {
            self.step_incident(Vec3::new(INCIDENT_STEP, 0.0, 0.0));
            changes.incident_ray = true;
        } else if input.is_key_held(KeyCode::KeyW) {
            self.step_incident(Vec3::new(0.0, 0.0, INCIDENT_STEP));
            changes.incident_ray = true;
        } else if input.is_key_held(KeyCode::KeyS) {
            self.step_incident(Vec3::new(0.0, 0.0, -INCIDENT_STEP));
            changes.incident_ray = true;
        }

        self.camera.move_position(
            camera_inc.x * CAMERA_POS_STEP,
            camera_inc.y * CAMERA_POS_STEP,
            camera_inc.z * CAMERA_POS_STEP,
        );

        let displacement = input.cursor_displacement();
        if input.left_button() && displacement.x != 0.0 {
            self.lobe_yaw += displacement.x;
            if self.lobe_yaw > 360.0 {
                self.lobe_yaw = 0.0;
            }
            changes.lobe_rotation = true;
        }
        if input.right_button() && displacement.y != 0.0 {
            self.camera.zoom(displacement.y * CAMERA_POS_STEP);
        }

        changes
    }

    /// Arrow keys move along the view axis: Y when top-down, Z otherwise
    fn push_camera(&self, camera_inc: &mut Vec3, amount: f32) {
        if self.camera.is_top_down() {
            camera_inc.y = amount;
        } else {
            camera_inc.z = amount;
        }
    }

    /// Renormalize, then offset
    fn step_incident(&mut self, delta: Vec3) {
        self.incident = self.incident() + delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app::InputState;
    use glam::Vec2;

    fn keys(keys: &[KeyCode]) -> InputState {
        InputState {
            keys: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn step(state: &mut ViewerState, previous: &InputState, current: &InputState) -> Changes {
        state.handle_input(&FrameInput::new(current, previous))
    }

    #[test]
    fn test_initial_state() {
        let state = ViewerState::default();
        assert_eq!(state.camera, Camera::default());
        assert!((state.incident() - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
        assert_eq!(state.lobe_yaw(), 0.0);
        assert!(!state.is_top_view());
    }

    #[test]
    fn test_toggle_twice_restores_camera() {
        let mut state = ViewerState::default();
        state.camera.zoom(-0.3);
        let before = state.camera;

        let idle = InputState::default();
        let shift = keys(&[KeyCode::ShiftRight]);

        step(&mut state, &idle, &shift);
        let changes = step(&mut state, &shift, &idle);
        assert!(changes.view_toggled);
        assert!(state.is_top_view());
        assert_eq!(state.camera.position, TOP_VIEW_POSITION);
        assert!(state.camera.is_top_down());

        step(&mut state, &idle, &shift);
        step(&mut state, &shift, &idle);
        assert!(!state.is_top_view());
        assert_eq!(state.camera, before);
    }

    #[test]
    fn test_holding_shift_does_not_toggle() {
        let mut state = ViewerState::default();
        let shift = keys(&[KeyCode::ShiftRight]);
        for _ in 0..5 {
            step(&mut state, &shift, &shift);
        }
        assert!(!state.is_top_view());
    }

    #[test]
    fn test_incident_stays_unit_length() {
        let mut state = ViewerState::default();
        let held = keys(&[KeyCode::KeyD]);
        for _ in 0..200 {
            let changes = step(&mut state, &held, &held);
            assert!(changes.incident_ray);
            assert!((state.incident().length() - 1.0).abs() < 1e-5);
        }
        assert!(state.incident().x > 0.99);
    }

    #[test]
    fn test_incident_step_direction() {
        let mut state = ViewerState::default();
        let before = state.incident();
        let held = keys(&[KeyCode::KeyW]);
        step(&mut state, &held, &held);
        assert!(state.incident().z > before.z);

        let held = keys(&[KeyCode::KeyA]);
        let before = state.incident();
        step(&mut state, &held, &held);
        assert!(state.incident().x < before.x);
    }

    #[test]
    fn test_one_key_action_per_frame() {
        let mut state = ViewerState::default();
        let held = keys(&[KeyCode::ArrowLeft, KeyCode::KeyA]);
        let changes = step(&mut state, &held, &held);
        assert!(changes.lobe_rotation);
        assert!(!changes.incident_ray);
        assert_eq!(state.lobe_yaw(), -LOBE_ROTATION_STEP);
    }

    #[test]
    fn test_arrow_keys_move_camera_and_clamp() {
        let mut state = ViewerState::default();
        let held = keys(&[KeyCode::ArrowUp]);
        step(&mut state, &held, &held);
        assert!((state.camera.position.z - (2.0 - ZOOM_KEY_STEP * CAMERA_POS_STEP)).abs() < 1e-6);

        for _ in 0..1000 {
            step(&mut state, &held, &held);
        }
        assert_eq!(state.camera.position.z, renderer::camera::DEPTH_MIN);
    }

    #[test]
    fn test_arrow_keys_use_y_in_top_view() {
        let mut state = ViewerState::default();
        state.toggle_top_view();
        let held = keys(&[KeyCode::ArrowDown]);
        step(&mut state, &held, &held);
        assert!(state.camera.position.y > TOP_VIEW_POSITION.y);
        assert_eq!(state.camera.position.z, 0.0);
    }

    #[test]
    fn test_left_drag_rotates_and_wraps() {
        let mut state = ViewerState::default();
        let previous = InputState {
            cursor: Some(Vec2::new(10.0, 10.0)),
            left_button: true,
            ..Default::default()
        };
        let current = InputState {
            cursor: Some(Vec2::new(250.0, 10.0)),
            left_button: true,
            ..Default::default()
        };
        let changes = step(&mut state, &previous, &current);
        assert!(changes.lobe_rotation);
        assert_eq!(state.lobe_yaw(), 240.0);

        step(&mut state, &previous, &current);
        assert_eq!(state.lobe_yaw(), 0.0);
    }

    #[test]
    fn test_drag_from_outside_window_is_ignored() {
        let mut state = ViewerState::default();
        let previous = InputState::default();
        let current = InputState {
            cursor: Some(Vec2::new(300.0, 300.0)),
            left_button: true,
            ..Default::default()
        };
        let changes = step(&mut state, &previous, &current);
        assert!(!changes.lobe_rotation);
        assert_eq!(state.lobe_yaw(), 0.0);
    }

    #[test]
    fn test_right_drag_zooms() {
        let mut state = ViewerState::default();
        let previous = InputState {
            cursor: Some(Vec2::new(100.0, 100.0)),
            right_button: true,
            ..Default::default()
        };
        let current = InputState {
            cursor: Some(Vec2::new(100.0, 90.0)),
            right_button: true,
            ..Default::default()
        };
        step(&mut state, &previous, &current);
        assert!((state.camera.position.z - 1.5).abs() < 1e-6);
    }
}
