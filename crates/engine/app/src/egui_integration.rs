//! Egui integration for the panel surface
//!
//! Wraps egui_winit for event translation and egui_glow for painting into
//! the panel window's GL context.

use anyhow::Context as _;
use egui::Context as EguiContext;
use egui_glow::Painter;
use egui_winit::State as EguiState;
use glow::{Context, HasContext};
use std::sync::Arc;
use winit::event::WindowEvent;
use winit::window::Window;

/// Background behind the panel widgets
const PANEL_CLEAR: [f32; 4] = [0.11, 0.11, 0.12, 1.0];

pub struct EguiIntegration {
    ctx: EguiContext,
    state: EguiState,
    painter: Painter,
    gl: Arc<Context>,
}

impl EguiIntegration {
    /// # Safety
    /// The panel GL context must be current when this is called.
    pub unsafe fn new(window: &Window, gl: Arc<Context>) -> anyhow::Result<Self> {
        let ctx = EguiContext::default();
        let state = EguiState::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );
        let painter = Painter::new(Arc::clone(&gl), "", None, false)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Failed to create egui painter")?;

        Ok(Self {
            ctx,
            state,
            painter,
            gl,
        })
    }

    /// Returns true if egui consumed the event
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Clear the panel and paint one egui frame built by `run_ui`
    ///
    /// # Safety
    /// The panel GL context must be current.
    pub unsafe fn run(&mut self, window: &Window, run_ui: impl FnMut(&EguiContext)) {
        let size = window.inner_size();
        unsafe {
            self.gl.viewport(0, 0, size.width as i32, size.height as i32);
            let [r, g, b, a] = PANEL_CLEAR;
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, run_ui);
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            full_output.pixels_per_point,
            &clipped_primitives,
            &full_output.textures_delta,
        );
    }
}

impl Drop for EguiIntegration {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
