//! Error types shared by every part of the framework.
//!
//! All failures during startup are fatal. They are returned as [`Error`] values from the
//! constructor that hit them and bubble up to `main` unchanged.

use std::path::PathBuf;

use crate::abs::ShaderStage;

/// Everything that can go wrong while bringing up or running the framework.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("windowing subsystem failed to initialize: {0}")]
    WindowingInit(String),
    #[error("window creation failed: {0}")]
    WindowCreation(String),
    #[error("failed to load mesh {path:?}: {reason}")]
    MeshLoad { path: PathBuf, reason: String },
    #[error("failed to read shader source {path:?}: {source}")]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader linkage failed: {0}")]
    ShaderLink(String),
    #[error("failed to allocate GPU resource: {0}")]
    GpuResource(String),
    #[error("failed to read config {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
    #[error("logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("engine was run before init")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;
