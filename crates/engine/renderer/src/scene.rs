//! The three drawables of the viewer: lobe, ground plane, incident ray
//!
//! Entities are fields rather than a list, so the draw order and the
//! presence of all three are fixed by the type.

use crate::entity::{Entity, Transform};
use crate::error::Result;
use crate::mesh::{GlMesh, MeshData};
use crate::shapes;
use glow::Context;

#[derive(Debug)]
pub struct Scene {
    lobe: Entity,
    plane: Entity,
    incident_ray: Entity,
}

impl Scene {
    /// Upload all three meshes; nothing is left allocated on failure
    ///
    /// # Safety
    /// Requires an active OpenGL context on the current thread.
    pub unsafe fn new(gl: &Context, lobe: &MeshData, incident_ray: &MeshData) -> Result<Self> {
        unsafe {
            let mut lobe = GlMesh::new(gl, lobe)?;
            let mut plane = match GlMesh::new(gl, &shapes::plane()) {
                Ok(mesh) => mesh,
                Err(e) => {
                    lobe.cleanup(gl);
                    return Err(e);
                }
            };
            let incident_ray = match GlMesh::new(gl, incident_ray) {
                Ok(mesh) => mesh,
                Err(e) => {
                    lobe.cleanup(gl);
                    plane.cleanup(gl);
                    return Err(e);
                }
            };

            Ok(Self {
                lobe: Entity::new(lobe),
                plane: Entity::new(plane),
                incident_ray: Entity::new(incident_ray),
            })
        }
    }

    /// Entities in draw order
    pub fn entities(&self) -> [&Entity; 3] {
        [&self.lobe, &self.plane, &self.incident_ray]
    }

    pub fn lobe(&self) -> &Entity {
        &self.lobe
    }

    pub fn incident_ray(&self) -> &Entity {
        &self.incident_ray
    }

    /// Yaw (degrees) applied to both the lobe and the incident ray
    pub fn set_lobe_yaw(&mut self, yaw: f32) {
        self.lobe.set_rotation(0.0, yaw, 0.0);
        self.incident_ray.set_rotation(0.0, yaw, 0.0);
    }

    /// Swap in a new lobe mesh, releasing the old one immediately
    ///
    /// The previous mesh stays in place if the upload fails.
    ///
    /// # Safety
    /// Requires the scene's context to be current.
    pub unsafe fn replace_lobe(&mut self, gl: &Context, data: &MeshData) -> Result<()> {
        unsafe { Self::replace(gl, &mut self.lobe, data) }
    }

    /// # Safety
    /// Requires the scene's context to be current.
    pub unsafe fn replace_incident_ray(&mut self, gl: &Context, data: &MeshData) -> Result<()> {
        unsafe { Self::replace(gl, &mut self.incident_ray, data) }
    }

    unsafe fn replace(gl: &Context, slot: &mut Entity, data: &MeshData) -> Result<()> {
        unsafe {
            let mesh = GlMesh::new(gl, data)?;
            let transform: Transform = slot.transform;
            let mut old = std::mem::replace(slot, Entity::new(mesh).with_transform(transform));
            old.mesh.cleanup(gl);
        }
        Ok(())
    }

    /// Release every mesh
    ///
    /// # Safety
    /// Requires the scene's context to be current.
    pub unsafe fn cleanup(&mut self, gl: &Context) {
        unsafe {
            self.lobe.mesh.cleanup(gl);
            self.plane.mesh.cleanup(gl);
            self.incident_ray.mesh.cleanup(gl);
        }
    }
}
