//! Viewer camera
//!
//! Position in world units, rotation in degrees (pitch, yaw, roll). Roll is
//! carried but never changed by relative rotation.

use glam::Vec3;

/// Lower bound of the depth coordinate
pub const DEPTH_MIN: f32 = 0.1;
/// Upper bound of the depth coordinate
pub const DEPTH_MAX: f32 = 2.5;

/// Pitch that puts the camera in top-down mode
pub const TOP_DOWN_PITCH: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            rotation: Vec3::ZERO,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(x, y, z);
    }

    /// Looking straight down the Y axis
    pub fn is_top_down(&self) -> bool {
        self.rotation.x == TOP_DOWN_PITCH
    }

    /// Move by a camera-local offset
    ///
    /// `z` is forward/back and `x` is strafe, both rotated by yaw. `y` is
    /// applied directly. The depth coordinate is clamped afterwards.
    pub fn move_position(&mut self, dx: f32, dy: f32, dz: f32) {
        let yaw = self.rotation.y;
        if dz != 0.0 {
            self.position.x += yaw.to_radians().sin() * -1.0 * dz;
            self.position.z += yaw.to_radians().cos() * dz;
        }
        if dx != 0.0 {
            let strafe = (yaw - 90.0).to_radians();
            self.position.x += strafe.sin() * -1.0 * dx;
            self.position.z += strafe.cos() * dx;
        }
        self.position.y += dy;
        self.clamp_depth();
    }

    /// Accumulate pitch and yaw; roll is ignored
    pub fn move_rotation(&mut self, dx: f32, dy: f32, _dz: f32) {
        self.rotation.x += dx;
        self.rotation.y += dy;
    }

    /// Move along the view axis (Y when top-down, Z otherwise)
    pub fn zoom(&mut self, dz: f32) {
        let step = self.rotation.y.to_radians().cos() * dz;
        if self.is_top_down() {
            self.position.y += step;
        } else {
            self.position.z += step;
        }
        self.clamp_depth();
    }

    /// The coordinate kept within [`DEPTH_MIN`, `DEPTH_MAX`]
    pub fn depth(&self) -> f32 {
        if self.is_top_down() {
            self.position.y
        } else {
            self.position.z
        }
    }

    fn clamp_depth(&mut self) {
        if self.is_top_down() {
            self.position.y = self.position.y.clamp(DEPTH_MIN, DEPTH_MAX);
        } else {
            self.position.z = self.position.z.clamp(DEPTH_MIN, DEPTH_MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(v: f32) -> bool {
        (DEPTH_MIN..=DEPTH_MAX).contains(&v)
    }

    #[test]
    fn test_move_position_clamps_for_all_yaws() {
        for yaw in (0..720).map(|d| d as f32 * 0.5 - 180.0) {
            for step in [-10.0, -0.5, 0.0, 0.05, 0.5, 10.0] {
                let mut camera = Camera::default();
                camera.set_rotation(0.0, yaw, 0.0);
                camera.move_position(step, step, step);
                assert!(
                    in_range(camera.position.z),
                    "yaw {} step {} gave z {}",
                    yaw,
                    step,
                    camera.position.z
                );
            }
        }
    }

    #[test]
    fn test_move_position_clamps_y_when_top_down() {
        for yaw in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let mut camera = Camera::default();
            camera.set_rotation(TOP_DOWN_PITCH, yaw, 0.0);
            camera.move_position(0.0, 5.0, 0.0);
            assert_eq!(camera.position.y, DEPTH_MAX);
            camera.move_position(0.0, -5.0, 0.0);
            assert_eq!(camera.position.y, DEPTH_MIN);
        }
    }

    #[test]
    fn test_forward_move_at_zero_yaw() {
        let mut camera = Camera::default();
        camera.move_position(0.0, 0.0, -0.5);
        assert!((camera.position.z - 1.5).abs() < 1e-6);
        assert!(camera.position.x.abs() < 1e-6);
    }

    #[test]
    fn test_strafe_at_zero_yaw() {
        let mut camera = Camera::default();
        camera.move_position(0.5, 0.0, 0.0);
        assert!((camera.position.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_move_rotation_ignores_roll() {
        let mut camera = Camera::default();
        camera.move_rotation(10.0, 20.0, 30.0);
        assert_eq!(camera.rotation, Vec3::new(10.0, 20.0, 0.0));
    }

    #[test]
    fn test_zoom_uses_view_axis() {
        let mut camera = Camera::default();
        camera.zoom(-0.5);
        assert!((camera.position.z - 1.5).abs() < 1e-6);

        camera.set_position(0.0, 0.5, 0.0);
        camera.set_rotation(TOP_DOWN_PITCH, 0.0, 0.0);
        camera.zoom(0.25);
        assert!((camera.position.y - 0.75).abs() < 1e-6);
        assert_eq!(camera.position.z, 0.0);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut camera = Camera::default();
        camera.zoom(100.0);
        assert_eq!(camera.depth(), DEPTH_MAX);
        camera.zoom(-100.0);
        assert_eq!(camera.depth(), DEPTH_MIN);
    }
}
