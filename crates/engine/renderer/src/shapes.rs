//! Fixed scene geometry: ground plane and incident-ray line

use crate::mesh::MeshData;
use glam::Vec3;

/// Half extent of the ground plane
pub const PLANE_HALF_EXTENT: f32 = 1.5;
pub const PLANE_COLOR: [f32; 3] = [0.8, 0.8, 0.8];
pub const INCIDENT_RAY_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// Two triangles over a four-vertex quad
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 3, 0, 2];

/// Square on the y = 0 plane
pub fn plane() -> MeshData {
    let h = PLANE_HALF_EXTENT;
    let positions = vec![
        -h, 0.0, -h, //
        -h, 0.0, h, //
        h, 0.0, h, //
        h, 0.0, -h,
    ];
    MeshData::with_color(positions, QUAD_INDICES.to_vec(), PLANE_COLOR)
}

/// Line from the normalized light source to `target`
///
/// Drawn as a degenerate quad so it shows up under wireframe rasterization.
pub fn incident_ray(source: Vec3, target: Vec3) -> MeshData {
    let s = source.normalize_or_zero().to_array();
    let t = target.to_array();
    let positions = [s, t, s, t].concat();
    MeshData::with_color(positions, QUAD_INDICES.to_vec(), INCIDENT_RAY_COLOR)
}
