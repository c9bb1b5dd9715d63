//! Runtime settings.
//!
//! Every value has a default, so the framework runs without any config file. A JSON file may
//! override any subset of the fields.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    model::ImportOptions,
};

/// Config file looked up in the working directory.
pub const CONFIG_PATH: &str = "ogl-framework.json";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub resources: ResourceConfig,
    pub mesh: ImportOptions,
    /// RGBA color the frame is cleared to.
    pub clear_color: [f32; 4],
    pub log_level: log::LevelFilter,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "OGL-Framework".to_string(),
            width: 800,
            height: 800,
            vsync: true,
        }
    }
}

/// A fixed camera looking at the model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.1, 1.0],
            target: [0.0, 0.1, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 0.42173,
            near: 0.1,
            far: 250.0,
        }
    }
}

impl CameraConfig {
    /// Right-handed perspective projection with an OpenGL depth range.
    pub fn projection(&self, width: u32, height: u32) -> Mat4 {
        let aspect_ratio = width as f32 / height.max(1) as f32;
        Mat4::perspective_rh_gl(self.fov, aspect_ratio, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(
            Vec3::from(self.position),
            Vec3::from(self.target),
            Vec3::from(self.up),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub model: PathBuf,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("resources/models/cube.obj"),
            vertex_shader: PathBuf::from("resources/shaders/simple.vert"),
            fragment_shader: PathBuf::from("resources/shaders/simple.frag"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            resources: ResourceConfig::default(),
            mesh: ImportOptions::default(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            log_level: log::LevelFilter::Info,
        }
    }
}

impl Config {
    /// Reads the config at `path`, falling back to the defaults when there is no such file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        Self::parse(&text).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses a config from JSON text.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }
}
