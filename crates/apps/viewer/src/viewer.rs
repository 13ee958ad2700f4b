//! BRDF lobe viewer: the [`App`] driven by the two-surface runner

use crate::config::ViewerConfig;
use crate::offline::{JobOutcome, OfflineRenderer, RenderJob};
use crate::panel::{self, PanelAction, PanelState, PanelView};
use crate::state::ViewerState;
use anyhow::Context as _;
use app::{App, FrameInput, RenderTarget};
use brdf::{BrdfRegistry, Destination, ParamValue};
use glam::Vec3;
use glow::Context;
use renderer::{FrameRenderer, LobeSampler, MeshData, Scene};
use std::sync::Arc;

/// Point on the surface the incident ray hits
const POINT_ON_SURFACE: Vec3 = Vec3::ZERO;

pub struct BrdfViewer {
    config: ViewerConfig,
    registry: BrdfRegistry,
    current: String,
    state: ViewerState,
    sampler: LobeSampler,
    scene: Option<Scene>,
    frame: Option<FrameRenderer>,
    panel: PanelState,
    pending: Vec<PanelAction>,
    offline: OfflineRenderer,
}

impl BrdfViewer {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let sampler = LobeSampler::new(config.lobe.rings, config.lobe.sectors)
            .context("Invalid lobe resolution")?;

        let mut registry = BrdfRegistry::new();
        if let Err(e) = registry.refresh(&config.brdf_output_path) {
            tracing::warn!("Failed to load custom BRDFs: {}", e);
        }

        let current = if registry.contains(&config.default_brdf) {
            config.default_brdf.clone()
        } else {
            tracing::warn!(
                "Unknown default BRDF {}; using {}",
                config.default_brdf,
                brdf::DEFAULT_ALIAS
            );
            brdf::DEFAULT_ALIAS.to_string()
        };

        Ok(Self {
            config,
            registry,
            current,
            state: ViewerState::default(),
            sampler,
            scene: None,
            frame: None,
            panel: PanelState::default(),
            pending: Vec::new(),
            offline: OfflineRenderer::new(),
        })
    }

    pub fn current_alias(&self) -> &str {
        &self.current
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn registry(&self) -> &BrdfRegistry {
        &self.registry
    }

    /// Lobe for the current BRDF and incident direction
    pub fn lobe_geometry(&self) -> MeshData {
        let incident = self.state.incident();
        tracing::info!("Incident Ray: ({:.3}, {:.3}, {:.3})", incident.x, incident.y, incident.z);
        tracing::info!("Evaluating BRDF {}", self.current);
        self.sampler.sample(incident, self.registry.get(&self.current))
    }

    pub fn incident_ray_geometry(&self) -> MeshData {
        renderer::shapes::incident_ray(self.state.incident(), POINT_ON_SURFACE)
    }

    unsafe fn rebuild_lobe(&mut self, gl: &Context) {
        let data = self.lobe_geometry();
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match unsafe { scene.replace_lobe(gl, &data) } {
            Ok(()) => tracing::debug!("Lobe rebuilt: {} vertices", data.vertex_count()),
            Err(e) => tracing::error!("Failed to rebuild lobe: {}", e),
        }
    }

    unsafe fn rebuild_incident_ray(&mut self, gl: &Context) {
        let data = self.incident_ray_geometry();
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if let Err(e) = unsafe { scene.replace_incident_ray(gl, &data) } {
            tracing::error!("Failed to rebuild incident ray: {}", e);
        }
    }

    /// Apply one panel action; returns true if the lobe must be rebuilt
    pub fn apply_action(&mut self, action: PanelAction) -> bool {
        match action {
            PanelAction::SelectBrdf(alias) => {
                if !self.registry.contains(&alias) {
                    tracing::warn!("Unknown BRDF {}", alias);
                    return false;
                }
                tracing::info!("Selected BRDF {}", alias);
                self.current = alias;
                true
            }
            PanelAction::RefreshBrdfs => {
                match self.registry.refresh(&self.config.brdf_output_path) {
                    Ok(count) => {
                        self.panel.status = Some(format!("Loaded {} custom BRDFs", count));
                    }
                    Err(e) => tracing::warn!("Failed to refresh BRDF list: {}", e),
                }
                false
            }
            PanelAction::SetParam {
                component,
                name,
                value,
            } => {
                self.set_param(&component, &name, value);
                false
            }
            PanelAction::BuildLobe => true,
            PanelAction::ResetBrdf => match self.registry.reset(&self.current) {
                Ok(()) => {
                    tracing::info!("Reset BRDF {}", self.current);
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to reset BRDF: {}", e);
                    false
                }
            },
            PanelAction::SaveBrdf(alias) => {
                self.save_custom(&alias);
                false
            }
            PanelAction::RenderScene(scene) => {
                self.render_scene(&scene);
                false
            }
        }
    }

    fn set_param(&mut self, component: &str, name: &str, value: ParamValue) {
        let Some(brdf) = self.registry.get_mut(&self.current) else {
            tracing::warn!("Unknown BRDF {}", self.current);
            return;
        };
        if let Err(e) = brdf.set_param(component, name, value) {
            tracing::warn!("Incorrect BRDF UI parameters: {}", e);
        }
    }

    fn save_custom(&mut self, alias: &str) {
        let alias = alias.trim();
        if alias.is_empty() {
            tracing::warn!("Cannot save a BRDF without an alias");
            return;
        }
        let result = self.registry.document(&self.current).and_then(|mut doc| {
            doc.alias = alias.to_string();
            doc.save(&self.config.brdf_output_path, Destination::Custom)
        });
        self.panel.status = Some(match result {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                tracing::warn!("Failed to save BRDF {}: {}", alias, e);
                format!("Save failed: {}", e)
            }
        });
    }

    /// Export the current BRDF for the offline renderer, then launch it
    fn render_scene(&mut self, scene: &str) {
        let Some(scene_file) = self.config.scene_path(scene) else {
            tracing::warn!("Unknown scene {}", scene);
            return;
        };

        let exported = self
            .registry
            .document(&self.current)
            .and_then(|doc| doc.save(&self.config.brdf_output_path, Destination::Sunflow));
        if let Err(e) = exported {
            tracing::warn!("Failed to export BRDF {}, not rendering: {}", self.current, e);
            self.panel.status = Some(format!("Export failed: {}", e));
            return;
        }

        let job = RenderJob::new(
            &self.config,
            &self.current,
            &scene_file,
            self.offline.completed(),
        );
        match self.offline.launch(job) {
            Ok(()) => self.panel.status = Some(format!("Rendering {}...", scene)),
            Err(e) => {
                tracing::warn!("{}", e);
                self.panel.status = Some(e.to_string());
            }
        }
    }

    fn poll_render(&mut self) {
        let Some(outcome) = self.offline.poll() else {
            return;
        };
        self.panel.status = Some(match outcome {
            JobOutcome::Finished { output, .. } => format!("Saved render to {}", output.display()),
            JobOutcome::Failed { error, .. } => format!("Render failed: {}", error),
        });
    }
}

impl App for BrdfViewer {
    unsafe fn init(&mut self, gl: &Arc<Context>) -> anyhow::Result<()> {
        unsafe {
            let frame = FrameRenderer::new(gl).context("Failed to create frame renderer")?;
            self.frame = Some(frame);

            let scene = Scene::new(gl, &self.lobe_geometry(), &self.incident_ray_geometry())
                .context("Failed to create scene")?;
            self.scene = Some(scene);
        }

        tracing::info!(
            "BRDF viewer ready: {} models, current {}",
            self.registry.len(),
            self.current
        );
        Ok(())
    }

    unsafe fn update(&mut self, gl: &Context, input: &FrameInput<'_>) {
        let changes = self.state.handle_input(input);

        let mut rebuild_lobe = changes.incident_ray;
        for action in std::mem::take(&mut self.pending) {
            rebuild_lobe |= self.apply_action(action);
        }
        self.poll_render();

        unsafe {
            if changes.incident_ray {
                self.rebuild_incident_ray(gl);
            }
            if rebuild_lobe {
                self.rebuild_lobe(gl);
            }
        }

        if let Some(scene) = self.scene.as_mut() {
            scene.set_lobe_yaw(self.state.lobe_yaw());
        }
    }

    unsafe fn render(&mut self, target: RenderTarget<'_>) {
        match target {
            RenderTarget::Viewport { gl, viewport } => {
                if let (Some(frame), Some(scene)) = (&self.frame, &self.scene) {
                    unsafe { frame.render(gl, viewport, &self.state.camera, scene) };
                }
            }
            RenderTarget::Panel { ctx } => {
                let params = self
                    .registry
                    .get(&self.current)
                    .map(|b| b.params())
                    .unwrap_or_default();
                let composite = self
                    .registry
                    .get(&self.current)
                    .is_some_and(|b| b.is_composite());
                let view = PanelView {
                    aliases: self.registry.aliases(),
                    current: &self.current,
                    composite,
                    params,
                    incident: self.state.incident(),
                    scenes: self.config.scenes.keys().map(String::as_str).collect(),
                    render_running: self.offline.is_running(),
                    completed_renders: self.offline.completed(),
                };
                let actions = panel::show(ctx, &mut self.panel, &view);
                self.pending.extend(actions);
            }
        }
    }

    unsafe fn shutdown(&mut self, gl: &Context) {
        if self.offline.is_running() {
            tracing::warn!("Exiting while a render is still running");
        }
        unsafe {
            if let Some(mut scene) = self.scene.take() {
                scene.cleanup(gl);
            }
            if let Some(mut frame) = self.frame.take() {
                frame.cleanup(gl);
            }
        }
        tracing::info!("BRDF viewer shut down");
    }
}
