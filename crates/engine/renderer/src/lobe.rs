//! Hemisphere tessellation and BRDF lobe sampling
//!
//! The template is a `rings x sectors` latitude/longitude grid of which only
//! the upper hemisphere (`y >= 0`) is kept. Sampling scales every template
//! direction by the BRDF's scalar response and colors it with the response's
//! RGB. Triangles are generated over the surviving grid cells only, so the
//! index buffer always matches the vertex buffer it is drawn with.

use crate::error::{Error, Result};
use crate::mesh::MeshData;
use brdf::Brdf;
use glam::Vec3;
use std::f64::consts::PI;

pub const DEFAULT_RINGS: usize = 150;
pub const DEFAULT_SECTORS: usize = 150;

/// Color of the undeformed sphere
pub const TEMPLATE_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Undeformed upper-hemisphere directions
#[derive(Debug, Clone, PartialEq)]
pub struct SphereTemplate {
    rings: usize,
    sectors: usize,
    directions: Vec<Vec3>,
    /// Template vertex index for each nominal grid slot, if the slot survived
    grid: Vec<Option<u32>>,
}

impl SphereTemplate {
    /// Tessellate the sphere and keep directions with `y >= 0`
    pub fn new(rings: usize, sectors: usize) -> Result<Self> {
        if rings < 2 || sectors < 2 {
            return Err(Error::Resolution { rings, sectors });
        }

        let mut directions = Vec::new();
        let mut grid = Vec::with_capacity(rings * sectors);
        for r in 0..rings {
            // Ring fraction in [0, 1]; the equator of an odd ring count lands on exactly 0.5
            let t = r as f64 / (rings - 1) as f64;
            let polar = PI * t;
            let y = (PI * (t - 0.5)).sin();
            for s in 0..sectors {
                if y < 0.0 {
                    grid.push(None);
                    continue;
                }
                let azimuth = 2.0 * PI * s as f64 / (sectors - 1) as f64;
                let x = azimuth.cos() * polar.sin();
                let z = azimuth.sin() * polar.sin();
                grid.push(Some(directions.len() as u32));
                directions.push(Vec3::new(x as f32, y as f32, z as f32));
            }
        }

        Ok(Self {
            rings,
            sectors,
            directions,
            grid,
        })
    }

    pub fn rings(&self) -> usize {
        self.rings
    }

    pub fn sectors(&self) -> usize {
        self.sectors
    }

    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    pub fn vertex_count(&self) -> usize {
        self.directions.len()
    }

    /// Two counter-clockwise triangles per grid cell whose corners all survive
    ///
    /// `remap` maps a template vertex index to its index in the emitted vertex
    /// buffer, or `None` if that vertex was dropped.
    fn build_indices(&self, remap: &[Option<u32>]) -> Vec<u32> {
        let (rings, sectors) = (self.rings, self.sectors);
        let slot = |r: usize, s: usize| -> Option<u32> {
            let template = self.grid[r * sectors + s]?;
            remap[template as usize]
        };

        let mut indices = Vec::with_capacity((rings - 1) * (sectors - 1) * 6);
        for r in 0..rings - 1 {
            for s in 0..sectors - 1 {
                let corners = [
                    slot(r, s),
                    slot(r + 1, s),
                    slot(r + 1, s + 1),
                    slot(r, s + 1),
                ];
                let [Some(a), Some(b), Some(c), Some(d)] = corners else {
                    // Cells on the hemisphere edge keep whichever triangle survives
                    if let (Some(a), Some(b), Some(c)) = (corners[0], corners[1], corners[2]) {
                        indices.extend_from_slice(&[a, b, c]);
                    }
                    if let (Some(c), Some(d), Some(a)) = (corners[2], corners[3], corners[0]) {
                        indices.extend_from_slice(&[c, d, a]);
                    }
                    continue;
                };
                indices.extend_from_slice(&[a, b, c, c, d, a]);
            }
        }
        indices
    }

    /// The undeformed hemisphere in the template color
    pub fn geometry(&self) -> MeshData {
        let remap: Vec<Option<u32>> = (0..self.directions.len() as u32).map(Some).collect();
        let positions = self.directions.iter().flat_map(|d| d.to_array()).collect();
        MeshData::with_color(positions, self.build_indices(&remap), TEMPLATE_COLOR)
    }
}

/// Produces lobe geometry from the template and a BRDF
#[derive(Debug, Clone)]
pub struct LobeSampler {
    template: SphereTemplate,
}

impl LobeSampler {
    pub fn new(rings: usize, sectors: usize) -> Result<Self> {
        Ok(Self {
            template: SphereTemplate::new(rings, sectors)?,
        })
    }

    pub fn template(&self) -> &SphereTemplate {
        &self.template
    }

    /// Replace the template with a new tessellation
    pub fn rebuild(&mut self, rings: usize, sectors: usize) -> Result<()> {
        self.template = SphereTemplate::new(rings, sectors)?;
        Ok(())
    }

    /// Deform the template by `brdf` for light arriving from `incident`
    ///
    /// Each direction `d` with `d.y >= 0` becomes `d * response.to_scalar()`
    /// colored by `response.rgb()`; other directions are dropped and the
    /// indices regenerated over the survivors. Without a BRDF the undeformed
    /// template is returned.
    pub fn sample(&self, incident: Vec3, brdf: Option<&dyn Brdf>) -> MeshData {
        let Some(brdf) = brdf else {
            return self.template.geometry();
        };

        let incident = incident.normalize_or_zero();
        let directions = self.template.directions();

        let mut positions = Vec::with_capacity(directions.len() * 3);
        let mut colors = Vec::with_capacity(directions.len() * 3);
        let mut remap = Vec::with_capacity(directions.len());
        let mut kept = 0u32;

        for direction in directions {
            let outgoing = direction.normalize_or_zero();
            if outgoing.y < 0.0 {
                remap.push(None);
                continue;
            }
            let response = brdf.evaluate(incident, outgoing);
            positions.extend_from_slice(&(outgoing * response.to_scalar()).to_array());
            colors.extend_from_slice(&response.rgb());
            remap.push(Some(kept));
            kept += 1;
        }

        let indices = self.template.build_indices(&remap);
        MeshData::new(positions, colors, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brdf::{Lambertian, Response, Spectrum};

    /// Same response in every direction
    #[derive(Debug, Clone)]
    struct Constant(Response);

    impl Brdf for Constant {
        fn model(&self) -> &'static str {
            "Constant"
        }

        fn evaluate(&self, _incident: Vec3, _outgoing: Vec3) -> Response {
            self.0
        }

        fn params(&self) -> Vec<brdf::Param> {
            Vec::new()
        }

        fn set_param(
            &mut self,
            component: &str,
            name: &str,
            _value: brdf::ParamValue,
        ) -> brdf::Result<()> {
            Err(brdf::Error::UnknownParam {
                component: component.to_string(),
                name: name.to_string(),
            })
        }

        fn box_clone(&self) -> Box<dyn Brdf> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_rejects_degenerate_resolution() {
        assert!(SphereTemplate::new(1, 10).is_err());
        assert!(SphereTemplate::new(10, 1).is_err());
        assert!(SphereTemplate::new(2, 2).is_ok());
    }

    #[test]
    fn test_template_is_deterministic() {
        let a = SphereTemplate::new(40, 30).unwrap();
        let b = SphereTemplate::new(40, 30).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.geometry(), b.geometry());
    }

    #[test]
    fn test_template_keeps_upper_hemisphere() {
        let template = SphereTemplate::new(21, 16).unwrap();
        // Rings 10..=20 have y >= 0 for an odd ring count
        assert_eq!(template.vertex_count(), 11 * 16);
        assert!(template.directions().iter().all(|d| d.y >= 0.0));
        for d in template.directions() {
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_template_geometry_is_valid() {
        let geometry = SphereTemplate::new(DEFAULT_RINGS, DEFAULT_SECTORS)
            .unwrap()
            .geometry();
        assert!(geometry.validate().is_ok());
        assert!(!geometry.indices.is_empty());
        assert_eq!(geometry.indices.len() % 3, 0);
        assert_eq!(geometry.color(0), TEMPLATE_COLOR);
    }

    #[test]
    fn test_without_brdf_returns_template() {
        let sampler = LobeSampler::new(30, 30).unwrap();
        assert_eq!(sampler.sample(Vec3::Y, None), sampler.template().geometry());
    }

    #[test]
    fn test_constant_response_gives_sphere_of_radius_k() {
        let sampler = LobeSampler::new(50, 40).unwrap();
        for k in [0.25f32, 1.0, 1.7] {
            let brdf = Constant(Response::new(Spectrum::WHITE, k));
            let lobe = sampler.sample(Vec3::new(0.3, 1.0, 0.1), Some(&brdf as &dyn Brdf));
            for i in 0..lobe.vertex_count() {
                let p = Vec3::from_array(lobe.position(i));
                assert!((p.length() - k).abs() < 1e-4, "vertex {} at {}", i, p.length());
            }
        }
    }

    #[test]
    fn test_sampled_count_never_exceeds_template() {
        let sampler = LobeSampler::new(60, 60).unwrap();
        let brdf = Lambertian::default();
        let lobe = sampler.sample(Vec3::new(1.0, 1.0, 0.0), Some(&brdf as &dyn Brdf));
        assert!(lobe.vertex_count() <= sampler.template().vertex_count());
        assert!(lobe.validate().is_ok());
    }

    #[test]
    fn test_non_positive_response_keeps_hemisphere_vertices() {
        /// Negative below 45 degrees elevation, positive above
        #[derive(Debug, Clone)]
        struct Split;

        impl Brdf for Split {
            fn model(&self) -> &'static str {
                "Split"
            }

            fn evaluate(&self, _incident: Vec3, outgoing: Vec3) -> Response {
                let scalar = if outgoing.y > 0.7 { 1.0 } else { -0.5 };
                Response::new(Spectrum::WHITE, scalar)
            }

            fn params(&self) -> Vec<brdf::Param> {
                Vec::new()
            }

            fn set_param(&mut self, _: &str, _: &str, _: brdf::ParamValue) -> brdf::Result<()> {
                Ok(())
            }

            fn box_clone(&self) -> Box<dyn Brdf> {
                Box::new(Split)
            }
        }

        let sampler = LobeSampler::new(45, 45).unwrap();
        let lobe = sampler.sample(Vec3::Y, Some(&Split as &dyn Brdf));
        let expected = sampler
            .template()
            .directions()
            .iter()
            .filter(|d| d.y >= 0.0)
            .count();
        assert_eq!(lobe.vertex_count(), expected);
        assert!(lobe.vertex_count() <= sampler.template().vertex_count());
        assert!(lobe.validate().is_ok());
    }

    #[test]
    fn test_indices_follow_surviving_vertices() {
        let template = SphereTemplate::new(9, 8).unwrap();
        let n = template.vertex_count();
        // Drop the first ring of the template
        let remap: Vec<Option<u32>> = (0..n)
            .map(|i| if i < 8 { None } else { Some((i - 8) as u32) })
            .collect();
        let indices = template.build_indices(&remap);
        assert!(indices.iter().all(|&i| (i as usize) < n - 8));
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_end_to_end_constant_half_green() {
        let sampler = LobeSampler::new(DEFAULT_RINGS, DEFAULT_SECTORS).unwrap();
        let brdf = Constant(Response::new(Spectrum::new(0.0, 1.0, 0.0), 0.5));
        let incident = Vec3::new(1.0, 1.0, 0.0).normalize();

        let lobe = sampler.sample(incident, Some(&brdf as &dyn Brdf));

        assert!(lobe.vertex_count() > 0);
        for i in 0..lobe.vertex_count() {
            let p = Vec3::from_array(lobe.position(i));
            assert!((p.length() - 0.5).abs() < 1e-5);
            assert_eq!(lobe.color(i), [0.0, 1.0, 0.0]);
        }
        assert!(lobe.validate().is_ok());
    }
}
