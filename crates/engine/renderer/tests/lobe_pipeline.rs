//! CPU side of the lobe pipeline: sampling, scene geometry and matrices

use brdf::{Brdf, BrdfRegistry, Phong};
use glam::{Vec3, Vec4};
use renderer::transformation;
use renderer::{shapes, Camera, LobeSampler, Transform};

fn incident() -> Vec3 {
    Vec3::new(1.0, 1.0, 0.0).normalize()
}

#[test]
fn test_registry_models_sample_to_valid_meshes() {
    let sampler = LobeSampler::new(24, 24).unwrap();
    let registry = BrdfRegistry::new();

    for alias in registry.aliases() {
        let mesh = sampler.sample(incident(), registry.get(alias));
        assert!(mesh.validate().is_ok(), "{}", alias);
        assert_eq!(mesh.indices.len() % 3, 0, "{}", alias);
        assert_eq!(mesh.vertex_count(), sampler.template().vertex_count(), "{}", alias);
    }
}

#[test]
fn test_phong_lobe_leans_towards_mirror_direction() {
    let sampler = LobeSampler::new(48, 48).unwrap();
    let phong = Phong::default();
    let mesh = sampler.sample(incident(), Some(&phong as &dyn Brdf));

    let farthest = (0..mesh.vertex_count())
        .map(|i| Vec3::from_array(mesh.position(i)))
        .max_by(|a, b| a.length().total_cmp(&b.length()))
        .unwrap();
    // Light arrives from +X, so the specular peak points to -X
    assert!(farthest.x < 0.0);
    assert!(farthest.y > 0.0);
}

#[test]
fn test_missing_brdf_gives_template() {
    let sampler = LobeSampler::new(10, 10).unwrap();
    let mesh = sampler.sample(incident(), None);
    assert_eq!(mesh, sampler.template().geometry());
}

#[test]
fn test_incident_ray_projects_inside_view() {
    let camera = Camera::default();
    let view = transformation::view(&camera);
    let projection = transformation::projection(60f32.to_radians(), 1000.0, 700.0, 0.01, 1000.0);
    let model_view = transformation::model_view(&Transform::default(), &view);

    let ray = shapes::incident_ray(incident(), Vec3::ZERO);
    for i in 0..ray.vertex_count() {
        let p = Vec3::from_array(ray.position(i));
        let clip = projection * model_view * Vec4::new(p.x, p.y, p.z, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "vertex {} at {:?}", i, ndc);
    }
}
