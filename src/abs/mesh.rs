//! Mesh management module.
//!
//! This module defines the [`MeshBuffer`] struct for managing mesh data on the GPU side.
//! Vertices should implement the [`Vertex`] trait.

use std::{path::Path, sync::Arc};

use glow::HasContext;

use crate::{
    error::{Error, Result},
    model::{ImportOptions, MeshData},
};

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex: bytemuck::Pod {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);
}

/// Represents an indexed triangle mesh stored on the GPU side.
pub struct MeshBuffer {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    vertex_count: usize,
    index_count: usize,
}

impl MeshBuffer {
    /// Loads the model at `path` and uploads it.
    pub fn create(
        gl: &Arc<glow::Context>,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<Self> {
        let data = MeshData::load(path, options)?;
        Self::from_data(gl, &data)
    }

    /// Uploads already imported mesh data into static buffers.
    pub fn from_data(gl: &Arc<glow::Context>, data: &MeshData) -> Result<Self> {
        Self::new(gl, &data.vertices, &data.indices)
    }

    /// Creates a new mesh from the given vertex and index data.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
    ) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::GpuResource)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(Error::GpuResource(e));
                }
            };
            let ibo = match gl.create_buffer() {
                Ok(ibo) => ibo,
                Err(e) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(Error::GpuResource(e));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            V::vertex_attribs(gl);

            // The element buffer binding is part of the VAO, so unbind the VAO first.
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                ibo,
                vertex_count: vertices.len(),
                index_count: indices.len(),
            })
        }
    }

    /// Draws the mesh as a triangle list over its whole index buffer.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_elements(glow::TRIANGLES, self.index_count as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }

    /// Returns the amount of indices used in the mesh.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Returns the amount of vertices uploaded.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for MeshBuffer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ibo);
        }
    }
}
