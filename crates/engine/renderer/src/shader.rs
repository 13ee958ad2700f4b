//! Shader compilation and the linked program used by the frame renderer

use crate::error::{Error, Result};
use glam::Mat4;
use glow::*;
use std::collections::HashMap;

/// Pass-through vertex shader: position and color at locations 0 and 1
pub const VERTEX_SOURCE: &str = r#"#version 330 core
layout (location = 0) in vec3 position;
layout (location = 1) in vec3 inColour;

out vec3 exColour;

uniform mat4 projectionMatrix;
uniform mat4 modelViewMatrix;

void main()
{
    gl_Position = projectionMatrix * modelViewMatrix * vec4(position, 1.0);
    exColour = inColour;
}
"#;

pub const FRAGMENT_SOURCE: &str = r#"#version 330 core
in vec3 exColour;
out vec4 fragColor;

void main()
{
    fragColor = vec4(exColour, 1.0);
}
"#;

/// Compile a shader from source code
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn compile_shader(gl: &Context, shader_type: u32, source: &str) -> Result<NativeShader> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(|message| Error::GlObject {
            object: "shader",
            message,
        })?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(Error::ShaderCompile(log));
        }

        Ok(shader)
    }
}

/// Create and link a shader program from vertex and fragment shader sources
///
/// # Safety
/// Requires an active OpenGL context
pub unsafe fn create_program(
    gl: &Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<NativeProgram> {
    unsafe {
        let program = gl.create_program().map_err(|message| Error::GlObject {
            object: "program",
            message,
        })?;

        let vertex_shader = match compile_shader(gl, VERTEX_SHADER, vertex_src) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_program(program);
                return Err(e);
            }
        };
        let fragment_shader = match compile_shader(gl, FRAGMENT_SHADER, fragment_src) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                gl.delete_program(program);
                return Err(e);
            }
        };

        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        gl.detach_shader(program, vertex_shader);
        gl.detach_shader(program, fragment_shader);
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(Error::ProgramLink(log));
        }

        Ok(program)
    }
}

/// Linked program with its matrix uniforms resolved up front
#[derive(Debug)]
pub struct ShaderProgram {
    program: Option<NativeProgram>,
    uniforms: HashMap<&'static str, NativeUniformLocation>,
}

impl ShaderProgram {
    /// Link `vertex_src`/`fragment_src` and look up `uniforms`
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn new(
        gl: &Context,
        vertex_src: &str,
        fragment_src: &str,
        uniforms: &[&'static str],
    ) -> Result<Self> {
        unsafe {
            let program = create_program(gl, vertex_src, fragment_src)?;
            let mut shader = Self {
                program: Some(program),
                uniforms: HashMap::new(),
            };
            for &name in uniforms {
                if let Err(e) = shader.create_uniform(gl, name) {
                    shader.cleanup(gl);
                    return Err(e);
                }
            }
            Ok(shader)
        }
    }

    unsafe fn create_uniform(&mut self, gl: &Context, name: &'static str) -> Result<()> {
        let program = self
            .program
            .ok_or_else(|| Error::MissingUniform(name.to_string()))?;
        let location = unsafe { gl.get_uniform_location(program, name) }
            .ok_or_else(|| Error::MissingUniform(name.to_string()))?;
        self.uniforms.insert(name, location);
        Ok(())
    }

    /// Upload a matrix to a uniform resolved at construction
    ///
    /// # Safety
    /// Requires this program to be bound.
    pub unsafe fn set_mat4(&self, gl: &Context, name: &str, value: &Mat4) {
        match self.uniforms.get(name) {
            Some(location) => unsafe {
                gl.uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array());
            },
            None => tracing::warn!("Uniform {} was not created", name),
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn bind(&self, gl: &Context) {
        unsafe { gl.use_program(self.program) };
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn unbind(&self, gl: &Context) {
        unsafe { gl.use_program(None) };
    }

    /// # Safety
    /// Requires the context the program was created in to be current.
    pub unsafe fn cleanup(&mut self, gl: &Context) {
        if let Some(program) = self.program.take() {
            unsafe {
                gl.use_program(None);
                gl.delete_program(program);
            }
            self.uniforms.clear();
        }
    }
}
