//! A minimal real-time OpenGL framework.
//!
//! It opens a window, loads one triangle mesh and one shader program, and spins the mesh about
//! the Y axis every frame. [`Engine`] owns the frame loop, [`Renderer`] owns the window and the
//! GL objects, and [`abs`] holds the thin SDL2/OpenGL wrappers both are built from.

pub mod abs;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod renderer;
pub mod timing;

pub use config::Config;
pub use engine::{Engine, FrameRenderer};
pub use error::{Error, Result};
pub use renderer::Renderer;
