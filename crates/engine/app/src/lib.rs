//! Two-surface application framework for the BRDF viewer
//!
//! - [`App`] trait: lifecycle hooks called by the runner
//! - [`FrameInput`]: per-frame input snapshot diffed against the previous frame
//! - [`run_app`]: creates the viewport and panel windows and drives the frame loop
//! - [`EguiIntegration`]: egui rendering into the panel surface

use glow::Context;
use std::sync::Arc;

pub mod cli;
mod egui_integration;
pub mod input;
pub mod placement;
mod runner;

pub use egui_integration::EguiIntegration;
pub use input::{FrameInput, InputState};
pub use placement::place_side_by_side;
pub use runner::{run_app, RunnerConfig, SurfaceConfig};

pub use egui;
pub use renderer::Viewport;
pub use winit::keyboard::KeyCode;

/// Surface a render call is directed at
///
/// The runner makes the matching context current before the call.
pub enum RenderTarget<'a> {
    /// 3D viewport; the GL context of the viewport window is current
    Viewport {
        gl: &'a Context,
        viewport: &'a mut Viewport,
    },
    /// Property panel; draw with egui only
    Panel { ctx: &'a egui::Context },
}

/// Application driven by the two-surface runner
pub trait App {
    /// Create GPU resources and initial state
    ///
    /// # Safety
    /// The viewport GL context must be current when this is called.
    unsafe fn init(&mut self, gl: &Arc<Context>) -> anyhow::Result<()>;

    /// Apply one frame of input and rebuild whatever it changed
    ///
    /// # Safety
    /// The viewport GL context must be current when this is called.
    unsafe fn update(&mut self, gl: &Context, input: &FrameInput<'_>);

    /// Draw into `target`
    ///
    /// # Safety
    /// The context belonging to `target` must be current.
    unsafe fn render(&mut self, target: RenderTarget<'_>);

    /// Checked after every update; returning true ends the loop
    fn should_close(&self) -> bool {
        false
    }

    /// Release GPU resources
    ///
    /// # Safety
    /// The viewport GL context must be current when this is called.
    unsafe fn shutdown(&mut self, gl: &Context);
}
