//! Input-to-geometry pipeline without a GL context

use app::{FrameInput, InputState, KeyCode};
use viewer::config::{LobeConfig, ViewerConfig};
use viewer::panel::PanelAction;
use viewer::BrdfViewer;

fn viewer(dir: &std::path::Path) -> BrdfViewer {
    BrdfViewer::new(ViewerConfig {
        brdf_output_path: dir.to_path_buf(),
        lobe: LobeConfig {
            rings: 16,
            sectors: 16,
        },
        ..ViewerConfig::default()
    })
    .unwrap()
}

fn held(keys: &[KeyCode]) -> InputState {
    InputState {
        keys: keys.iter().copied().collect(),
        ..Default::default()
    }
}

#[test]
fn test_incident_keys_reshape_lobe() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = viewer(dir.path());
    viewer.apply_action(PanelAction::SelectBrdf("PhongBRDF".to_string()));
    let before = viewer.lobe_geometry();

    let start = viewer.state().incident();
    let input = held(&[KeyCode::KeyA]);
    for _ in 0..10 {
        let changes = viewer
            .state_mut()
            .handle_input(&FrameInput::new(&input, &input));
        assert!(changes.incident_ray);
    }
    assert!(viewer.state().incident().x < start.x);

    let geometry = viewer.lobe_geometry();
    assert_ne!(geometry, before);
    assert_eq!(geometry.indices, before.indices);
    assert!(geometry.validate().is_ok());
}

#[test]
fn test_every_builtin_produces_valid_hemisphere() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = viewer(dir.path());
    let aliases: Vec<String> = viewer
        .registry()
        .aliases()
        .into_iter()
        .map(str::to_string)
        .collect();

    for alias in aliases {
        assert!(viewer.apply_action(PanelAction::SelectBrdf(alias.clone())));
        let geometry = viewer.lobe_geometry();
        assert!(geometry.validate().is_ok(), "{} produced invalid geometry", alias);
        assert!(!geometry.indices.is_empty(), "{} produced no triangles", alias);
        for i in 0..geometry.vertex_count() {
            assert!(geometry.position(i)[1] >= 0.0, "{} vertex {} below the plane", alias, i);
        }
    }
}

#[test]
fn test_incident_ray_runs_from_source_to_origin() {
    let dir = tempfile::tempdir().unwrap();
    let viewer = viewer(dir.path());
    let ray = viewer.incident_ray_geometry();
    let source = viewer.state().incident().to_array();

    assert_eq!(ray.position(0), source);
    assert_eq!(ray.position(1), [0.0, 0.0, 0.0]);
    assert_eq!(ray.color(0), [0.0, 1.0, 0.0]);
}
