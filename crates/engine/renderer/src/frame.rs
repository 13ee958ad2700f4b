//! Per-frame drawing of the scene into the viewport surface

use crate::camera::Camera;
use crate::error::Result;
use crate::scene::Scene;
use crate::shader::{FRAGMENT_SOURCE, ShaderProgram, VERTEX_SOURCE};
use crate::transformation;
use glam::Mat4;
use glow::*;

pub const FOV_DEGREES: f32 = 60.0;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;
pub const CLEAR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const PROJECTION_UNIFORM: &str = "projectionMatrix";
const MODEL_VIEW_UNIFORM: &str = "modelViewMatrix";

/// Framebuffer size of the viewport surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Set by the window layer on resize, cleared once the GL viewport is updated
    pub resized: bool,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resized: true,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.resized = true;
        }
    }

    /// Projection for the current size; a zero height is treated as one pixel
    pub fn projection(&self) -> Mat4 {
        transformation::projection(
            FOV_DEGREES.to_radians(),
            self.width as f32,
            self.height.max(1) as f32,
            Z_NEAR,
            Z_FAR,
        )
    }
}

/// Owns the shader program and issues the draw calls for a frame
#[derive(Debug)]
pub struct FrameRenderer {
    shader: ShaderProgram,
}

impl FrameRenderer {
    /// Compile the scene shader and set up wireframe depth-tested drawing
    ///
    /// # Safety
    /// Requires the viewport context to be current.
    pub unsafe fn new(gl: &Context) -> Result<Self> {
        unsafe {
            let shader = ShaderProgram::new(
                gl,
                VERTEX_SOURCE,
                FRAGMENT_SOURCE,
                &[PROJECTION_UNIFORM, MODEL_VIEW_UNIFORM],
            )?;

            gl.enable(DEPTH_TEST);
            gl.enable(STENCIL_TEST);
            gl.polygon_mode(FRONT_AND_BACK, LINE);
            let [r, g, b, a] = CLEAR_COLOR;
            gl.clear_color(r, g, b, a);

            tracing::debug!("Frame renderer initialized");
            Ok(Self { shader })
        }
    }

    /// Draw lobe, plane and incident ray, in that order
    ///
    /// # Safety
    /// Requires the viewport context to be current.
    pub unsafe fn render(&self, gl: &Context, viewport: &mut Viewport, camera: &Camera, scene: &Scene) {
        unsafe {
            let [r, g, b, a] = CLEAR_COLOR;
            gl.clear_color(r, g, b, a);
            gl.clear(COLOR_BUFFER_BIT | DEPTH_BUFFER_BIT | STENCIL_BUFFER_BIT);

            if viewport.resized {
                gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
                viewport.resized = false;
            }

            self.shader.bind(gl);
            self.shader
                .set_mat4(gl, PROJECTION_UNIFORM, &viewport.projection());

            let view = transformation::view(camera);
            for entity in scene.entities() {
                let model_view = transformation::model_view(&entity.transform, &view);
                self.shader.set_mat4(gl, MODEL_VIEW_UNIFORM, &model_view);
                entity.mesh.render(gl);
            }

            self.shader.unbind(gl);
        }
    }

    /// # Safety
    /// Requires the viewport context to be current.
    pub unsafe fn cleanup(&mut self, gl: &Context) {
        unsafe { self.shader.cleanup(gl) };
    }
}
