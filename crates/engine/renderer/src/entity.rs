//! Drawable scene items

use crate::mesh::GlMesh;
use glam::Vec3;

/// Placement of a drawable; rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// A mesh with its placement; owns the mesh's GPU buffers
#[derive(Debug)]
pub struct Entity {
    pub mesh: GlMesh,
    pub transform: Transform,
}

impl Entity {
    pub fn new(mesh: GlMesh) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.rotation = Vec3::new(x, y, z);
    }
}
