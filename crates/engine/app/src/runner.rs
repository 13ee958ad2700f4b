//! Two-surface runner
//!
//! Creates the viewport and panel windows, each with its own GL context (the
//! panel's shares objects with the viewport's), and drives the frame loop:
//! input snapshot, update, viewport render + swap, panel render + swap.
//! Before anything touches a surface its context is made current.

use anyhow::{anyhow, Context as _};
use glam::Vec2;
use glow::{Context, HasContext};
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowButtons, WindowId};

#[cfg(target_os = "linux")]
use winit::platform::x11::EventLoopBuilderExtX11;

use crate::input::{FrameInput, InputState};
use crate::placement::place_side_by_side;
use crate::{App, EguiIntegration, RenderTarget};
use renderer::Viewport;

/// Title and initial size of one window
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl SurfaceConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
        }
    }
}

/// Window and context configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub viewport: SurfaceConfig,
    pub panel: SurfaceConfig,
    pub gl_major: u8,
    pub gl_minor: u8,
    /// Preferred MSAA sample count; the closest config not above it is used
    pub samples: u8,
    /// Exit after this many frames, saving the last viewport frame
    pub debug_frames: Option<u64>,
    pub screenshot_path: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            viewport: SurfaceConfig::new("Viewport", 1000, 700),
            panel: SurfaceConfig::new("Panel", 400, 700),
            gl_major: 4,
            gl_minor: 1,
            samples: 4,
            debug_frames: None,
            screenshot_path: PathBuf::from("output/frame_last.png"),
        }
    }
}

impl RunnerConfig {
    pub fn with_viewport(mut self, title: impl Into<String>, width: u32, height: u32) -> Self {
        self.viewport = SurfaceConfig::new(title, width, height);
        self
    }

    pub fn with_panel(mut self, title: impl Into<String>, width: u32, height: u32) -> Self {
        self.panel = SurfaceConfig::new(title, width, height);
        self
    }

    pub fn with_debug_frames(mut self, frames: Option<u64>) -> Self {
        self.debug_frames = frames;
        self
    }
}

/// Which surface's context is current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceId {
    Viewport,
    Panel,
}

/// A window with its GL surface, context and function table
///
/// Fields drop in declaration order, so the surface goes before its window.
struct WindowGl {
    gl: Arc<Context>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl WindowGl {
    fn create(
        window: Window,
        display: &Display,
        config: &Config,
        context: NotCurrentContext,
    ) -> anyhow::Result<Self> {
        let handle = window
            .window_handle()
            .context("Window has no native handle")?
            .as_raw();
        let size = window.inner_size();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            handle,
            non_zero(size.width),
            non_zero(size.height),
        );

        let surface = unsafe { display.create_window_surface(config, &attrs) }
            .context("Failed to create window surface")?;
        let context = context
            .make_current(&surface)
            .context("Failed to make context current")?;
        let gl = Arc::new(unsafe {
            Context::from_loader_function_cstr(|s| display.get_proc_address(s))
        });

        Ok(Self {
            window,
            surface,
            context,
            gl,
        })
    }

    fn make_current(&self) -> anyhow::Result<()> {
        self.context
            .make_current(&self.surface)
            .context("Failed to switch GL context")
    }

    fn swap(&self) -> anyhow::Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("Failed to swap buffers")
    }

    fn resize(&self, size: PhysicalSize<u32>) {
        self.surface
            .resize(&self.context, non_zero(size.width), non_zero(size.height));
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

/// Everything that exists only while the windows are open
struct Surfaces {
    viewport: WindowGl,
    panel: WindowGl,
    egui: Option<EguiIntegration>,
    current: SurfaceId,
}

impl Surfaces {
    /// Make `id` the current context; a no-op if it already is
    fn activate(&mut self, id: SurfaceId) -> anyhow::Result<()> {
        if self.current != id {
            match id {
                SurfaceId::Viewport => self.viewport.make_current()?,
                SurfaceId::Panel => self.panel.make_current()?,
            }
            self.current = id;
        }
        Ok(())
    }
}

struct Runner<A: App> {
    config: RunnerConfig,
    app: A,
    surfaces: Option<Surfaces>,
    viewport: Viewport,

    input: InputState,
    previous_input: InputState,

    frame_count: u64,
    initialized: bool,
    error: Option<anyhow::Error>,
}

impl<A: App> Runner<A> {
    fn new(app: A, config: RunnerConfig) -> Self {
        let viewport = Viewport::new(config.viewport.width, config.viewport.height);
        Self {
            config,
            app,
            surfaces: None,
            viewport,
            input: InputState::default(),
            previous_input: InputState::default(),
            frame_count: 0,
            initialized: false,
            error: None,
        }
    }

    /// Drop both snapshots so no press or release spans the gap
    fn forget_input(&mut self) {
        self.input.clear();
        self.previous_input.clear();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_surfaces(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Surfaces> {
        let viewport_attrs = Window::default_attributes()
            .with_title(&self.config.viewport.title)
            .with_inner_size(LogicalSize::new(
                self.config.viewport.width,
                self.config.viewport.height,
            ))
            .with_visible(false);

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_transparency(false);

        let samples = self.config.samples;
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(viewport_attrs))
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        let better = config.num_samples() <= samples
                            && config.num_samples() > accum.num_samples();
                        if better {
                            config
                        } else {
                            accum
                        }
                    })
                    // find_configs reports an error instead of an empty iterator
                    .expect("no GL configs offered")
            })
            .map_err(|e| anyhow!("Failed to create viewport window: {e}"))?;
        let viewport_window = window.context("Display builder returned no window")?;
        tracing::debug!("Picked GL config with {} samples", gl_config.num_samples());

        let display = gl_config.display();
        let context_api = ContextApi::OpenGl(Some(Version::new(
            self.config.gl_major,
            self.config.gl_minor,
        )));

        let viewport_handle = viewport_window
            .window_handle()
            .context("Viewport window has no native handle")?
            .as_raw();
        let viewport_context = unsafe {
            display.create_context(
                &gl_config,
                &ContextAttributesBuilder::new()
                    .with_profile(GlProfile::Core)
                    .with_context_api(context_api)
                    .build(Some(viewport_handle)),
            )
        }
        .context("Failed to create viewport GL context")?;
        let viewport = WindowGl::create(viewport_window, &display, &gl_config, viewport_context)?;

        if let Err(e) = viewport
            .surface
            .set_swap_interval(&viewport.context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            tracing::warn!("Could not enable vsync: {}", e);
        }

        let panel_attrs = Window::default_attributes()
            .with_title(&self.config.panel.title)
            .with_inner_size(LogicalSize::new(
                self.config.panel.width,
                self.config.panel.height,
            ))
            .with_resizable(false)
            .with_enabled_buttons(WindowButtons::MINIMIZE)
            .with_visible(false);
        let panel_window = glutin_winit::finalize_window(event_loop, panel_attrs, &gl_config)
            .context("Failed to create panel window")?;
        let panel_handle = panel_window
            .window_handle()
            .context("Panel window has no native handle")?
            .as_raw();
        let panel_context = unsafe {
            display.create_context(
                &gl_config,
                &ContextAttributesBuilder::new()
                    .with_sharing(&viewport.context)
                    .with_profile(GlProfile::Core)
                    .with_context_api(context_api)
                    .build(Some(panel_handle)),
            )
        }
        .context("Failed to create panel GL context")?;
        let panel = WindowGl::create(panel_window, &display, &gl_config, panel_context)?;

        if let Err(e) = panel
            .surface
            .set_swap_interval(&panel.context, SwapInterval::DontWait)
        {
            tracing::debug!("Could not disable panel vsync: {}", e);
        }

        let egui = unsafe { EguiIntegration::new(&panel.window, Arc::clone(&panel.gl))? };

        Self::place_windows(event_loop, &viewport.window, &panel.window);
        viewport.window.set_visible(true);
        panel.window.set_visible(true);

        let mut surfaces = Surfaces {
            viewport,
            panel,
            egui: Some(egui),
            current: SurfaceId::Panel,
        };
        surfaces.activate(SurfaceId::Viewport)?;
        Ok(surfaces)
    }

    fn place_windows(event_loop: &ActiveEventLoop, viewport: &Window, panel: &Window) {
        let Some(monitor) = event_loop
            .primary_monitor()
            .or_else(|| viewport.current_monitor())
        else {
            tracing::debug!("No monitor information; leaving window placement to the system");
            return;
        };

        let monitor_size = monitor.size();
        let viewport_size = viewport.outer_size();
        let panel_size = panel.outer_size();
        let (viewport_pos, panel_pos) = place_side_by_side(
            (monitor_size.width, monitor_size.height),
            (viewport_size.width, viewport_size.height),
            (panel_size.width, panel_size.height),
        );

        let origin = monitor.position();
        viewport.set_outer_position(PhysicalPosition::new(
            origin.x + viewport_pos.0,
            origin.y + viewport_pos.1,
        ));
        panel.set_outer_position(PhysicalPosition::new(
            origin.x + panel_pos.0,
            origin.y + panel_pos.1,
        ));
    }

    fn viewport_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(surfaces) = &self.surfaces {
                    surfaces.viewport.resize(size);
                }
                self.viewport.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.input.keys.insert(code);
                        }
                        ElementState::Released => {
                            if code == KeyCode::Escape {
                                tracing::info!("Escape released, closing");
                                event_loop.exit();
                            }
                            self.input.keys.remove(&code);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.cursor = None;
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.input.left_button = pressed,
                    MouseButton::Right => self.input.right_button = pressed,
                    _ => {}
                }
            }
            WindowEvent::Focused(false) => self.forget_input(),
            _ => {}
        }
    }

    fn panel_event(&mut self, event: WindowEvent) {
        let Some(surfaces) = self.surfaces.as_mut() else {
            return;
        };
        match &event {
            // The panel has no close button; stray requests are ignored
            WindowEvent::CloseRequested => return,
            WindowEvent::Resized(size) => surfaces.panel.resize(*size),
            _ => {}
        }
        if let Some(egui) = surfaces.egui.as_mut() {
            egui.on_window_event(&surfaces.panel.window, &event);
        }
    }

    /// One iteration: update, viewport render + swap, panel render + swap
    fn frame(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let Some(surfaces) = self.surfaces.as_mut() else {
            return Ok(());
        };

        surfaces.activate(SurfaceId::Viewport)?;
        let gl = Arc::clone(&surfaces.viewport.gl);
        let input = FrameInput::new(&self.input, &self.previous_input);
        unsafe { self.app.update(&gl, &input) };

        if self.app.should_close() {
            tracing::info!("App requested exit");
            event_loop.exit();
            return Ok(());
        }

        unsafe {
            self.app.render(RenderTarget::Viewport {
                gl: &gl,
                viewport: &mut self.viewport,
            });
        }

        let debug_exit = self
            .config
            .debug_frames
            .is_some_and(|frames| self.frame_count + 1 >= frames);
        if debug_exit {
            let size = surfaces.viewport.window.inner_size();
            match capture_frame(&gl, size, &self.config.screenshot_path) {
                Ok(()) => tracing::info!(
                    "Screenshot saved to: {}",
                    self.config.screenshot_path.display()
                ),
                Err(e) => tracing::warn!("Failed to capture frame: {:#}", e),
            }
        }
        surfaces.viewport.swap()?;

        surfaces.activate(SurfaceId::Panel)?;
        if let Some(egui) = surfaces.egui.as_mut() {
            let app = &mut self.app;
            unsafe {
                egui.run(&surfaces.panel.window, |ctx| {
                    app.render(RenderTarget::Panel { ctx });
                });
            }
        }
        surfaces.panel.swap()?;
        surfaces.activate(SurfaceId::Viewport)?;

        self.previous_input = self.input.clone();
        self.frame_count += 1;

        if debug_exit {
            tracing::info!("Debug run finished after {} frames", self.frame_count);
            event_loop.exit();
        }
        Ok(())
    }

    /// Release resources in dependency order
    ///
    /// Panel painter first, then input, then the app's GPU objects while the
    /// viewport context is still alive, then the surfaces themselves.
    fn teardown(&mut self) {
        let Some(mut surfaces) = self.surfaces.take() else {
            return;
        };

        if let Err(e) = surfaces.activate(SurfaceId::Panel) {
            tracing::warn!("{:#}", e);
        }
        drop(surfaces.egui.take());

        self.forget_input();

        match surfaces.activate(SurfaceId::Viewport) {
            Ok(()) if self.initialized => {
                let gl = Arc::clone(&surfaces.viewport.gl);
                unsafe { self.app.shutdown(&gl) };
            }
            Ok(()) => {}
            Err(e) => tracing::warn!("Skipping GPU cleanup: {:#}", e),
        }

        drop(surfaces);
        tracing::info!("Shut down after {} frames", self.frame_count);
    }
}

impl<A: App> ApplicationHandler for Runner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surfaces.is_some() || self.error.is_some() {
            return;
        }

        tracing::info!("Initializing windows and GL contexts");
        let surfaces = match self.create_surfaces(event_loop) {
            Ok(surfaces) => surfaces,
            Err(e) => return self.fail(event_loop, e),
        };

        let size = surfaces.viewport.window.inner_size();
        self.viewport.resize(size.width, size.height);
        self.viewport.resized = true;

        let gl = Arc::clone(&surfaces.viewport.gl);
        self.surfaces = Some(surfaces);

        if !self.initialized {
            if let Err(e) = unsafe { self.app.init(&gl) } {
                return self.fail(event_loop, e.context("Failed to initialize app"));
            }
            self.initialized = true;
            tracing::info!("App initialized");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(surfaces) = &self.surfaces else {
            return;
        };
        if window_id == surfaces.viewport.window.id() {
            self.viewport_event(event_loop, event);
        } else if window_id == surfaces.panel.window.id() {
            self.panel_event(event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.initialized || event_loop.exiting() {
            return;
        }
        if let Err(e) = self.frame(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Read back the viewport framebuffer and save it as an image
fn capture_frame(
    gl: &Context,
    size: PhysicalSize<u32>,
    output_path: &std::path::Path,
) -> anyhow::Result<()> {
    use image::{ImageBuffer, Rgba};

    if size.width == 0 || size.height == 0 {
        anyhow::bail!("Viewport has zero size");
    }
    let width = size.width as usize;
    let height = size.height as usize;
    let mut pixels = vec![0u8; width * height * 4];

    unsafe {
        gl.read_pixels(
            0,
            0,
            size.width as i32,
            size.height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(Some(&mut pixels)),
        );
    }

    // OpenGL rows start at the bottom
    let row = width * 4;
    let flipped: Vec<u8> = pixels.chunks_exact(row).rev().flatten().copied().collect();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(size.width, size.height, flipped)
            .context("Failed to create image buffer")?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save(output_path)?;
    Ok(())
}

fn create_event_loop() -> anyhow::Result<EventLoop<()>> {
    #[cfg(target_os = "linux")]
    let event_loop = {
        let mut builder = EventLoop::builder();
        builder.with_x11();
        builder.build()
    };

    #[cfg(not(target_os = "linux"))]
    let event_loop = EventLoop::new();

    event_loop.context("Failed to create event loop")
}

/// Open both windows and run `app` until either exits or fails
pub fn run_app<A: App>(app: A, config: RunnerConfig) -> anyhow::Result<()> {
    let event_loop = create_event_loop()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner::new(app, config);
    event_loop
        .run_app(&mut runner)
        .context("Event loop error")?;

    match runner.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdleApp;

    impl App for IdleApp {
        unsafe fn init(&mut self, _gl: &Arc<Context>) -> anyhow::Result<()> {
            Ok(())
        }

        unsafe fn update(&mut self, _gl: &Context, _input: &FrameInput<'_>) {}

        unsafe fn render(&mut self, _target: RenderTarget<'_>) {}

        unsafe fn shutdown(&mut self, _gl: &Context) {}
    }

    #[test]
    fn test_focus_loss_forgets_held_keys() {
        let mut runner = Runner::new(IdleApp, RunnerConfig::default());
        runner.input.keys.insert(KeyCode::ShiftRight);
        runner.input.left_button = true;
        runner.previous_input = runner.input.clone();

        runner.forget_input();

        let input = FrameInput::new(&runner.input, &runner.previous_input);
        assert!(!input.key_pressed_once(KeyCode::ShiftRight));
        assert!(!input.is_key_held(KeyCode::ShiftRight));
        assert_eq!(runner.previous_input, InputState::default());
    }

    #[test]
    fn test_release_before_focus_loss_is_not_replayed() {
        let mut runner = Runner::new(IdleApp, RunnerConfig::default());
        // Key went down in the last frame, then focus was lost before release
        runner.previous_input.keys.insert(KeyCode::ShiftRight);

        runner.forget_input();
        let input = FrameInput::new(&runner.input, &runner.previous_input);
        assert!(!input.key_pressed_once(KeyCode::ShiftRight));
    }
}
