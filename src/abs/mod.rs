//! This module contains the thin wrappers over SDL2 and OpenGL the renderer is built from:
//! the window and its context, shader programs and GPU meshes.

pub mod mesh;
pub mod shader;
pub mod window;

pub use mesh::*;
pub use shader::*;
pub use window::*;
