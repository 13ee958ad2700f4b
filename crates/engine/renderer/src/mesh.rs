//! GPU mesh: one position buffer, one color buffer and one index buffer
//!
//! Buffers live outside Rust's ownership model, so a mesh must be released
//! with [`GlMesh::cleanup`] while its context is current. Dropping an
//! unreleased mesh logs a leak warning.

use crate::error::{Error, Result};
use glow::*;

/// Attribute location of vertex positions
pub const POSITION_LOCATION: u32 = 0;
/// Attribute location of vertex colors
pub const COLOR_LOCATION: u32 = 1;

/// Host-side geometry: flat xyz positions, flat rgb colors, triangle indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<f32>, colors: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            colors,
            indices,
        }
    }

    /// Uniformly colored geometry
    pub fn with_color(positions: Vec<f32>, indices: Vec<u32>, rgb: [f32; 3]) -> Self {
        let colors = rgb.repeat(positions.len() / 3);
        Self::new(positions, colors, indices)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Check array shapes and that every index names an existing vertex
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "position array length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.colors.len() != self.positions.len() {
            return Err(Error::InvalidMesh(format!(
                "{} color components for {} position components",
                self.colors.len(),
                self.positions.len()
            )));
        }
        let count = self.vertex_count();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }

    /// Position of vertex `i`
    pub fn position(&self, i: usize) -> [f32; 3] {
        [
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        ]
    }

    /// Color of vertex `i`
    pub fn color(&self, i: usize) -> [f32; 3] {
        [self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]]
    }
}

#[derive(Debug)]
struct Handles {
    vao: NativeVertexArray,
    positions: NativeBuffer,
    colors: NativeBuffer,
    indices: NativeBuffer,
}

/// GL objects created so far during mesh construction
///
/// Anything still held when this is dropped is deleted, so an early return
/// leaves no orphaned objects behind.
struct PendingObjects<'a> {
    gl: &'a Context,
    vao: Option<NativeVertexArray>,
    buffers: Vec<NativeBuffer>,
}

impl<'a> PendingObjects<'a> {
    fn new(gl: &'a Context) -> Self {
        Self {
            gl,
            vao: None,
            buffers: Vec::with_capacity(3),
        }
    }

    unsafe fn vertex_array(&mut self) -> Result<NativeVertexArray> {
        let vao = unsafe { self.gl.create_vertex_array() }.map_err(|e| Error::GlObject {
            object: "VAO",
            message: e,
        })?;
        self.vao = Some(vao);
        Ok(vao)
    }

    unsafe fn buffer(&mut self, object: &'static str) -> Result<NativeBuffer> {
        let buffer = unsafe { self.gl.create_buffer() }
            .map_err(|message| Error::GlObject { object, message })?;
        self.buffers.push(buffer);
        Ok(buffer)
    }

    fn commit(mut self) {
        self.vao = None;
        self.buffers.clear();
    }
}

impl Drop for PendingObjects<'_> {
    fn drop(&mut self) {
        if self.vao.is_none() && self.buffers.is_empty() {
            return;
        }
        tracing::warn!("Releasing partially created mesh");
        unsafe {
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(ARRAY_BUFFER, None);
            for buffer in self.buffers.drain(..) {
                self.gl.delete_buffer(buffer);
            }
            if let Some(vao) = self.vao.take() {
                self.gl.delete_vertex_array(vao);
            }
        }
    }
}

/// GPU-resident mesh
#[derive(Debug)]
pub struct GlMesh {
    handles: Option<Handles>,
    index_count: i32,
    vertex_count: usize,
}

impl GlMesh {
    /// Upload `data` into new buffers and record the attribute layout
    ///
    /// # Safety
    /// Requires an active OpenGL context on the current thread.
    pub unsafe fn new(gl: &Context, data: &MeshData) -> Result<Self> {
        data.validate()?;

        unsafe {
            let mut pending = PendingObjects::new(gl);

            let vao = pending.vertex_array()?;
            gl.bind_vertex_array(Some(vao));

            let positions = pending.buffer("position VBO")?;
            gl.bind_buffer(ARRAY_BUFFER, Some(positions));
            gl.buffer_data_u8_slice(
                ARRAY_BUFFER,
                bytemuck::cast_slice(&data.positions),
                STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(POSITION_LOCATION, 3, FLOAT, false, 0, 0);

            let colors = pending.buffer("color VBO")?;
            gl.bind_buffer(ARRAY_BUFFER, Some(colors));
            gl.buffer_data_u8_slice(ARRAY_BUFFER, bytemuck::cast_slice(&data.colors), STATIC_DRAW);
            gl.vertex_attrib_pointer_f32(COLOR_LOCATION, 3, FLOAT, false, 0, 0);

            let indices = pending.buffer("EBO")?;
            gl.bind_buffer(ELEMENT_ARRAY_BUFFER, Some(indices));
            gl.buffer_data_u8_slice(
                ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&data.indices),
                STATIC_DRAW,
            );

            gl.bind_buffer(ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
            pending.commit();

            Ok(Self {
                handles: Some(Handles {
                    vao,
                    positions,
                    colors,
                    indices,
                }),
                index_count: data.indices.len() as i32,
                vertex_count: data.vertex_count(),
            })
        }
    }

    pub fn index_count(&self) -> usize {
        self.index_count as usize
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn is_released(&self) -> bool {
        self.handles.is_none()
    }

    /// Draw as an indexed triangle list
    ///
    /// Leaves no vertex array or attribute enabled afterwards. A released mesh
    /// draws nothing.
    ///
    /// # Safety
    /// Requires the context the mesh was created in to be current.
    pub unsafe fn render(&self, gl: &Context) {
        let Some(handles) = &self.handles else {
            tracing::warn!("Skipping draw of released mesh");
            return;
        };

        unsafe {
            gl.bind_vertex_array(Some(handles.vao));
            gl.enable_vertex_attrib_array(POSITION_LOCATION);
            gl.enable_vertex_attrib_array(COLOR_LOCATION);

            gl.draw_elements(TRIANGLES, self.index_count, UNSIGNED_INT, 0);

            gl.disable_vertex_attrib_array(POSITION_LOCATION);
            gl.disable_vertex_attrib_array(COLOR_LOCATION);
            gl.bind_vertex_array(None);
        }
    }

    /// Delete the buffers and vertex array; later calls do nothing
    ///
    /// # Safety
    /// Requires the context the mesh was created in to be current.
    pub unsafe fn cleanup(&mut self, gl: &Context) {
        let Some(handles) = self.handles.take() else {
            return;
        };

        unsafe {
            gl.disable_vertex_attrib_array(POSITION_LOCATION);
            gl.bind_buffer(ARRAY_BUFFER, None);
            gl.delete_buffer(handles.positions);
            gl.delete_buffer(handles.colors);
            gl.delete_buffer(handles.indices);
            gl.bind_vertex_array(None);
            gl.delete_vertex_array(handles.vao);
        }
    }
}

impl Drop for GlMesh {
    fn drop(&mut self) {
        if self.handles.is_some() {
            tracing::warn!(
                "GlMesh dropped without cleanup ({} vertices leaked on the GPU)",
                self.vertex_count
            );
        }
    }
}
