//! Projection, view and model-view matrices

use crate::camera::Camera;
use crate::entity::Transform;
use glam::{Mat4, Vec3};

/// Perspective projection; `height` must be non-zero
pub fn projection(fov: f32, width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov, width / height, near, far)
}

/// World-to-camera matrix: pitch about X, then yaw about Y, then `-position`
pub fn view(camera: &Camera) -> Mat4 {
    Mat4::from_rotation_x(camera.rotation.x.to_radians())
        * Mat4::from_rotation_y(camera.rotation.y.to_radians())
        * Mat4::from_translation(-camera.position)
}

/// Object-to-camera matrix for an entity
///
/// Object angles are negated relative to the camera's, so a positive yaw turns
/// the object under the fixed light rather than the viewer around it.
pub fn model_view(transform: &Transform, view: &Mat4) -> Mat4 {
    let rotation = transform.rotation;
    let model = Mat4::from_translation(transform.position)
        * Mat4::from_rotation_x(-rotation.x.to_radians())
        * Mat4::from_rotation_y(-rotation.y.to_radians())
        * Mat4::from_rotation_z(-rotation.z.to_radians())
        * Mat4::from_scale(Vec3::splat(transform.scale));
    *view * model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_view_inverse_recovers_position() {
        let cameras = [
            Camera::default(),
            Camera::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(90.0, 0.0, 0.0)),
            Camera::new(Vec3::new(1.2, -0.3, 2.1), Vec3::new(33.0, -120.0, 0.0)),
        ];
        for camera in cameras {
            let eye = view(&camera).inverse().transform_point3(Vec3::ZERO);
            assert!(
                approx(eye, camera.position),
                "expected {:?}, got {:?}",
                camera.position,
                eye
            );
        }
    }

    #[test]
    fn test_view_rotates_about_camera_position() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 90.0, 0.0));
        let at_eye = view(&camera).transform_point3(camera.position);
        assert!(approx(at_eye, Vec3::ZERO));
    }

    #[test]
    fn test_top_down_view_looks_down() {
        let camera = Camera::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(90.0, 0.0, 0.0));
        let origin = view(&camera).transform_point3(Vec3::ZERO);
        // The world origin lies straight ahead (negative Z in view space)
        assert!(approx(origin, Vec3::new(0.0, 0.0, -0.5)));
    }

    #[test]
    fn test_model_view_identity_transform() {
        let v = view(&Camera::default());
        let mv = model_view(&Transform::default(), &v);
        assert!(mv.abs_diff_eq(v, 1e-6));
    }

    #[test]
    fn test_model_view_negates_yaw() {
        let transform = Transform {
            rotation: Vec3::new(0.0, 90.0, 0.0),
            ..Default::default()
        };
        let mv = model_view(&transform, &Mat4::IDENTITY);
        let p = mv.transform_point3(Vec3::X);
        // rotate_y(-90deg) maps +X to +Z
        assert!(approx(p, Vec3::Z), "got {:?}", p);
    }

    #[test]
    fn test_model_view_applies_scale_then_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            scale: 2.0,
            ..Default::default()
        };
        let p = model_view(&transform, &Mat4::IDENTITY).transform_point3(Vec3::Y);
        assert!(approx(p, Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_projection_aspect() {
        let p = projection(60f32.to_radians(), 1000.0, 700.0, 0.01, 1000.0);
        let expected = Mat4::perspective_rh_gl(60f32.to_radians(), 1000.0 / 700.0, 0.01, 1000.0);
        assert!(p.abs_diff_eq(expected, 1e-6));
    }
}
