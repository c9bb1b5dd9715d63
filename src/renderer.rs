//! The renderer: window, GL state and the per-frame draw sequence.
//!
//! A [`Renderer`] only exists fully set up. Construction runs every startup step in order and
//! returns the first error; dropping it releases the GPU objects, then the context, the window
//! and SDL, exactly once.

use std::sync::Arc;

use glam::Mat4;
use glow::HasContext;

use crate::{
    abs::{GlWindow, MeshBuffer, ShaderProgram, WindowHandle, WindowSignal},
    config::{CameraConfig, Config},
    error::Result,
};

/// Camera matrices and the model's spin.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    pub projection: Mat4,
    pub view: Mat4,
    angle: f32,
}

impl SceneState {
    pub fn new(camera: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            projection: camera.projection(width, height),
            view: camera.view(),
            angle: 0.0,
        }
    }

    /// Turns the model by `-dt` radians about +Y and returns the new world matrix.
    ///
    /// The angle is never wrapped.
    pub fn advance(&mut self, dt: f32) -> Mat4 {
        self.angle -= dt;
        self.world()
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_rotation_y(self.angle)
    }

    /// Current rotation in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

/// Cached framebuffer dimensions as last reported by the window system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferSize {
    pub width: i32,
    pub height: i32,
    /// Set on every resize and never cleared. Nothing reacts to it yet: the projection and
    /// viewport keep the size the window was created with.
    pub resized: bool,
}

impl FramebufferSize {
    fn on_resize(&mut self, width: i32, height: i32) {
        log::debug!("framebuffer resized to {width}x{height}");
        self.width = width;
        self.height = height;
        self.resized = true;
    }
}

/// Applies the window signals queued during one frame.
///
/// `drawable_size` is only called for resizes and must return the size in pixels.
fn dispatch_signals(
    signals: impl IntoIterator<Item = WindowSignal>,
    handle: &WindowHandle,
    size: &mut FramebufferSize,
    drawable_size: impl Fn() -> (u32, u32),
) {
    for signal in signals {
        match signal {
            WindowSignal::CloseRequested => handle.request_close(),
            WindowSignal::FramebufferResized => {
                let (width, height) = drawable_size();
                size.on_resize(width as i32, height as i32);
            }
        }
    }
}

/// Draws one mesh with one shader program into one window.
pub struct Renderer {
    // Field order is drop order: GPU objects first, the window and SDL last.
    mesh: MeshBuffer,
    shader: ShaderProgram,
    gl: Arc<glow::Context>,
    window: GlWindow,
    handle: WindowHandle,
    scene: SceneState,
    size: FramebufferSize,
    clear_color: [f32; 4],
}

impl Renderer {
    /// Opens the window, sets up GL state and loads the mesh and shaders named in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let (window, gl) = GlWindow::new(&config.window)?;
        let (width, height) = window.drawable_size();

        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            gl.enable(glow::CULL_FACE);
            gl.enable(glow::DEPTH_TEST);
        }

        let mesh = MeshBuffer::create(&gl, &config.resources.model, &config.mesh)?;
        let shader = ShaderProgram::create(
            &gl,
            &config.resources.vertex_shader,
            &config.resources.fragment_shader,
        )?;

        log::info!(
            "renderer ready: {} vertices, {} indices, {}x{} framebuffer",
            mesh.vertex_count(),
            mesh.index_count(),
            width,
            height
        );

        Ok(Self {
            mesh,
            shader,
            gl,
            window,
            handle: WindowHandle::default(),
            scene: SceneState::new(&config.camera, width, height),
            size: FramebufferSize {
                width: width as i32,
                height: height as i32,
                resized: false,
            },
            clear_color: config.clear_color,
        })
    }

    /// Renders one frame advanced by `dt` seconds and presents it.
    pub fn draw(&mut self, dt: f32) {
        let [r, g, b, a] = self.clear_color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let world = self.scene.advance(dt);

        self.shader.use_program();
        self.shader.set_uniform("projection", self.scene.projection);
        self.shader.set_uniform("view", self.scene.view);
        self.shader.set_uniform("world", world);
        self.mesh.draw();

        self.present();
    }

    /// Handle the owner polls for the close request.
    pub fn window(&self) -> WindowHandle {
        self.handle.clone()
    }

    /// Records a new framebuffer size, in pixels, for this renderer's window.
    pub fn on_resize(&mut self, width: i32, height: i32) {
        self.size.on_resize(width, height);
    }

    /// Cached framebuffer size in pixels.
    pub fn framebuffer_size(&self) -> FramebufferSize {
        self.size
    }

    /// Whether the window system reported a resize since creation.
    pub fn framebuffer_resized(&self) -> bool {
        self.size.resized
    }

    /// Swaps buffers, then dispatches whatever the window system queued meanwhile.
    fn present(&mut self) {
        self.window.swap_buffers();
        let signals = self.window.poll_signals();
        let window = &self.window;
        dispatch_signals(signals, &self.handle, &mut self.size, || window.drawable_size());
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        log::info!("shutting down renderer for window {}", self.window.id());
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn angle_decreases_by_dt_every_frame() {
        let mut scene = SceneState::new(&CameraConfig::default(), 800, 800);
        let dt = 1.0 / 60.0;
        for _ in 0..120 {
            scene.advance(dt);
        }
        assert!((scene.angle() - (-120.0 * dt)).abs() < 1e-4);
    }

    #[test]
    fn angle_is_not_wrapped() {
        let mut scene = SceneState::new(&CameraConfig::default(), 800, 800);
        scene.advance(10.0);
        assert_eq!(scene.angle(), -10.0);
    }

    #[test]
    fn world_spins_about_y() {
        let mut scene = SceneState::new(&CameraConfig::default(), 800, 800);
        let world = scene.advance(-std::f32::consts::FRAC_PI_2);
        let x = world.transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        assert_eq!(world.transform_vector3(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn projection_uses_the_framebuffer_aspect() {
        let camera = CameraConfig::default();
        let square = SceneState::new(&camera, 800, 800);
        let wide = SceneState::new(&camera, 1600, 800);
        assert!((square.projection.x_axis.x - 2.0 * wide.projection.x_axis.x).abs() < 1e-5);
        assert_eq!(square.projection.y_axis.y, wide.projection.y_axis.y);
    }

    #[test]
    fn resize_updates_size_and_sets_the_flag() {
        let mut size = FramebufferSize {
            width: 800,
            height: 800,
            resized: false,
        };
        size.on_resize(1024, 768);
        assert_eq!(
            size,
            FramebufferSize {
                width: 1024,
                height: 768,
                resized: true
            }
        );
        size.on_resize(800, 800);
        assert!(size.resized);
    }

    #[test]
    fn resizes_record_the_drawable_size_in_pixels() {
        let handle = WindowHandle::default();
        let mut size = FramebufferSize {
            width: 1600,
            height: 1600,
            resized: false,
        };

        // A HiDPI window whose drawable is twice its window size.
        dispatch_signals([WindowSignal::FramebufferResized], &handle, &mut size, || {
            (2048, 1536)
        });

        assert_eq!(
            size,
            FramebufferSize {
                width: 2048,
                height: 1536,
                resized: true
            }
        );
        assert!(!handle.should_close());
    }

    #[test]
    fn close_signals_reach_the_handle_without_touching_the_size() {
        let handle = WindowHandle::default();
        let observer = handle.clone();
        let mut size = FramebufferSize {
            width: 800,
            height: 800,
            resized: false,
        };

        dispatch_signals([WindowSignal::CloseRequested], &handle, &mut size, || {
            panic!("the drawable size is only read on resize")
        });

        assert!(observer.should_close());
        assert!(!size.resized);
        assert_eq!((size.width, size.height), (800, 800));
    }

    #[test]
    fn routed_size_changes_end_up_in_the_cache() {
        use sdl2::event::{Event, WindowEvent};

        let handle = WindowHandle::default();
        let mut size = FramebufferSize {
            width: 800,
            height: 800,
            resized: false,
        };
        let events = [
            Event::Window {
                timestamp: 0,
                window_id: 1,
                win_event: WindowEvent::SizeChanged(400, 300),
            },
            Event::Window {
                timestamp: 0,
                window_id: 2,
                win_event: WindowEvent::Close,
            },
        ];

        let signals = events.iter().filter_map(|event| crate::abs::route_event(1, event));
        dispatch_signals(signals, &handle, &mut size, || (800, 600));

        assert_eq!((size.width, size.height), (800, 600));
        assert!(size.resized);
        assert!(!handle.should_close());
    }
}
