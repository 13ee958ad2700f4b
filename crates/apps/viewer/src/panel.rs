//! Property panel: BRDF selection, parameter editing, saving and rendering
//!
//! The panel never touches viewer state directly. Each frame it returns the
//! actions the user triggered and the viewer applies them in its next update.

use brdf::{Param, ParamValue, Spectrum};
use egui::{ComboBox, DragValue, RichText, Ui};
use glam::Vec3;

pub const SPECTRUM_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;
pub const SPECTRUM_SPEED: f64 = 0.01;
pub const FLOAT_RANGE: std::ops::RangeInclusive<f32> = -5.0..=5.0;
pub const FLOAT_SPEED: f64 = 0.5;

/// User request raised by the panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SelectBrdf(String),
    RefreshBrdfs,
    SetParam {
        component: String,
        name: String,
        value: ParamValue,
    },
    BuildLobe,
    ResetBrdf,
    SaveBrdf(String),
    RenderScene(String),
}

/// Read-only snapshot of what the panel displays
pub struct PanelView<'a> {
    pub aliases: Vec<&'a str>,
    pub current: &'a str,
    /// Group parameters under their component names
    pub composite: bool,
    pub params: Vec<Param>,
    pub incident: Vec3,
    pub scenes: Vec<&'a str>,
    pub render_running: bool,
    pub completed_renders: u32,
}

/// Widget state that lives across frames
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub save_alias: String,
    pub selected_scene: Option<String>,
    /// Result of the last save or render, shown under its button
    pub status: Option<String>,
}

pub fn show(ctx: &egui::Context, state: &mut PanelState, view: &PanelView<'_>) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            brdf_selector(ui, view, &mut actions);
            ui.separator();

            let v = view.incident;
            ui.label(format!("Incident Ray: ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z));
            ui.separator();

            ui.label(RichText::new(format!("{} Properties", view.current)).strong());
            param_editors(ui, &view.params, view.composite, &mut actions);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Build BRDF Lobe").clicked() {
                    actions.push(PanelAction::BuildLobe);
                }
                if ui.button("Reset BRDF").clicked() {
                    actions.push(PanelAction::ResetBrdf);
                }
            });
            ui.separator();

            save_section(ui, state, &mut actions);
            ui.separator();

            render_section(ui, state, view, &mut actions);

            if let Some(status) = &state.status {
                ui.add_space(4.0);
                ui.label(status);
            }
        });
    });

    actions
}

fn brdf_selector(ui: &mut Ui, view: &PanelView<'_>, actions: &mut Vec<PanelAction>) {
    ui.label("Select BRDF:");
    ui.horizontal(|ui| {
        ComboBox::from_id_salt("brdf_alias")
            .selected_text(view.current)
            .width(220.0)
            .show_ui(ui, |ui| {
                for &alias in &view.aliases {
                    if ui.selectable_label(alias == view.current, alias).clicked()
                        && alias != view.current
                    {
                        actions.push(PanelAction::SelectBrdf(alias.to_string()));
                    }
                }
            });
        if ui.button("Refresh BRDF List").clicked() {
            actions.push(PanelAction::RefreshBrdfs);
        }
    });
}

fn param_editors(ui: &mut Ui, params: &[Param], composite: bool, actions: &mut Vec<PanelAction>) {
    let mut component = "";

    for param in params {
        if composite && param.component != component {
            component = param.component.as_str();
            ui.add_space(4.0);
            ui.label(RichText::new(component).italics());
        }

        let edited = match param.value {
            ParamValue::Spectrum(spectrum) => spectrum_editor(ui, &param.name, spectrum),
            ParamValue::Float(value) => float_editor(ui, &param.name, value),
        };
        if let Some(value) = edited {
            actions.push(PanelAction::SetParam {
                component: param.component.clone(),
                name: param.name.clone(),
                value,
            });
        }
    }
}

fn spectrum_editor(ui: &mut Ui, name: &str, spectrum: Spectrum) -> Option<ParamValue> {
    let mut rgb = spectrum.to_array();
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label(name);
        changed |= ui.color_edit_button_rgb(&mut rgb).changed();
        for (label, channel) in ["R", "G", "B"].into_iter().zip(rgb.iter_mut()) {
            ui.label(label);
            changed |= ui
                .add(
                    DragValue::new(channel)
                        .range(SPECTRUM_RANGE)
                        .clamp_existing_to_range(false)
                        .speed(SPECTRUM_SPEED)
                        .fixed_decimals(2),
                )
                .changed();
        }
    });

    changed.then(|| ParamValue::Spectrum(Spectrum::from_array(rgb)))
}

fn float_editor(ui: &mut Ui, name: &str, mut value: f32) -> Option<ParamValue> {
    let changed = ui
        .horizontal(|ui| {
            ui.label(name);
            // Model defaults may sit outside the drag range; only user drags are clamped
            ui.add(
                DragValue::new(&mut value)
                    .range(FLOAT_RANGE)
                    .clamp_existing_to_range(false)
                    .speed(FLOAT_SPEED),
            )
            .changed()
        })
        .inner;
    changed.then_some(ParamValue::Float(value))
}

fn save_section(ui: &mut Ui, state: &mut PanelState, actions: &mut Vec<PanelAction>) {
    ui.label("Save current BRDF as:");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut state.save_alias);
        let alias = state.save_alias.trim();
        if ui
            .add_enabled(!alias.is_empty(), egui::Button::new("Save BRDF"))
            .clicked()
        {
            actions.push(PanelAction::SaveBrdf(alias.to_string()));
        }
    });
}

fn render_section(
    ui: &mut Ui,
    state: &mut PanelState,
    view: &PanelView<'_>,
    actions: &mut Vec<PanelAction>,
) {
    ui.label("Render scene:");
    if state.selected_scene.is_none() {
        state.selected_scene = view.scenes.first().map(|s| s.to_string());
    }

    ui.horizontal(|ui| {
        let selected = state.selected_scene.clone().unwrap_or_default();
        ComboBox::from_id_salt("sunflow_scene")
            .selected_text(selected.as_str())
            .width(220.0)
            .show_ui(ui, |ui| {
                for &scene in &view.scenes {
                    if ui.selectable_label(scene == selected, scene).clicked() {
                        state.selected_scene = Some(scene.to_string());
                    }
                }
            });

        let button = ui.add_enabled(
            !view.render_running && state.selected_scene.is_some(),
            egui::Button::new("Render Scene"),
        );
        if button.clicked() {
            if let Some(scene) = &state.selected_scene {
                actions.push(PanelAction::RenderScene(scene.clone()));
            }
        }
    });

    if view.render_running {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Rendering...");
        });
    } else {
        ui.label(format!("Completed renders: {}", view.completed_renders));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brdf::{Brdf, BrdfRegistry, ShinyDiffuse};

    fn view_of<'a>(registry: &'a BrdfRegistry, alias: &'a str) -> PanelView<'a> {
        let brdf = registry.get(alias).unwrap();
        PanelView {
            aliases: registry.aliases(),
            current: alias,
            composite: brdf.is_composite(),
            params: brdf.params(),
            incident: Vec3::new(1.0, 1.0, 0.0).normalize(),
            scenes: vec!["Cornell Box", "Teapot"],
            render_running: false,
            completed_renders: 0,
        }
    }

    fn idle_frames(view: &PanelView<'_>, frames: usize) -> Vec<PanelAction> {
        let ctx = egui::Context::default();
        let mut state = PanelState::default();
        let mut actions = Vec::new();
        for _ in 0..frames {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                actions.extend(show(ctx, &mut state, view));
            });
        }
        actions
    }

    #[test]
    fn test_idle_frames_raise_no_actions() {
        let registry = BrdfRegistry::new();
        for alias in registry.aliases() {
            let actions = idle_frames(&view_of(&registry, alias), 3);
            assert!(actions.is_empty(), "{} raised {:?}", alias, actions);
        }
    }

    #[test]
    fn test_out_of_range_default_is_left_alone() {
        let exponent = ShinyDiffuse::default()
            .params()
            .into_iter()
            .find(|p| p.name == "exponent")
            .unwrap();
        let ParamValue::Float(value) = exponent.value else {
            panic!("exponent should be a float");
        };
        assert!(!FLOAT_RANGE.contains(&value));

        let registry = BrdfRegistry::new();
        let actions = idle_frames(&view_of(&registry, brdf::DEFAULT_ALIAS), 3);
        assert!(actions.is_empty(), "{:?}", actions);
    }

    #[test]
    fn test_first_scene_is_preselected() {
        let registry = BrdfRegistry::new();
        let view = view_of(&registry, brdf::DEFAULT_ALIAS);
        let ctx = egui::Context::default();
        let mut state = PanelState::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            show(ctx, &mut state, &view);
        });
        assert_eq!(state.selected_scene.as_deref(), Some("Cornell Box"));
    }
}
