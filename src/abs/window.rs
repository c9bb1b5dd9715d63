//! SDL2 and OpenGL window management.
//!
//! This module defines the [`GlWindow`] struct which encapsulates the SDL2 window and the
//! OpenGL context drawn into it, plus the small pieces the frame loop needs to react to the
//! window: [`WindowHandle`] for the close request and [`route_event`] for picking out the
//! events that belong to one window.

use std::{cell::Cell, rc::Rc, sync::Arc};

use sdl2::{
    event::{Event, WindowEvent},
    video::{GLProfile, SwapInterval},
};

use crate::{
    config::WindowConfig,
    error::{Error, Result},
};

/// A window-system notification this crate reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowSignal {
    CloseRequested,
    /// The drawable changed size. SDL reports the new size in window coordinates, so the
    /// receiver reads the pixel size back from the window.
    FramebufferResized,
}

/// Maps an SDL event onto a [`WindowSignal`] for the window with id `window_id`.
///
/// Events addressed to other windows yield `None`. `Quit` is process wide and always closes.
pub fn route_event(window_id: u32, event: &Event) -> Option<WindowSignal> {
    match event {
        Event::Quit { .. } => Some(WindowSignal::CloseRequested),
        Event::Window {
            window_id: id,
            win_event,
            ..
        } if *id == window_id => match win_event {
            WindowEvent::Close => Some(WindowSignal::CloseRequested),
            WindowEvent::SizeChanged(..) => Some(WindowSignal::FramebufferResized),
            _ => None,
        },
        _ => None,
    }
}

/// Shared view of a window's close request.
///
/// Cloning yields another view of the same flag. The flag is `Rc` based, so it can never
/// leave the thread that owns the window.
#[derive(Clone, Debug, Default)]
pub struct WindowHandle {
    close_requested: Rc<Cell<bool>>,
}

impl WindowHandle {
    /// Returns `true` once the window system asked the window to close.
    pub fn should_close(&self) -> bool {
        self.close_requested.get()
    }

    /// Marks the window as closing.
    pub fn request_close(&self) {
        self.close_requested.set(true);
    }
}

/// An SDL2 window with a current OpenGL 3.3 core context.
pub struct GlWindow {
    // Field order is drop order: the context goes before the window, SDL itself goes last.
    _gl_context: sdl2::video::GLContext,
    window: sdl2::video::Window,
    event_pump: sdl2::EventPump,
    _video_subsystem: sdl2::VideoSubsystem,
    _sdl: sdl2::Sdl,
}

impl GlWindow {
    /// Creates the window and its context and loads the GL function pointers.
    ///
    /// On failure every SDL object created so far is dropped before the error is returned,
    /// which also shuts SDL down again.
    pub fn new(config: &WindowConfig) -> Result<(Self, Arc<glow::Context>)> {
        let sdl = sdl2::init().map_err(Error::WindowingInit)?;
        let video_subsystem = sdl.video().map_err(Error::WindowingInit)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);
        gl_attr.set_double_buffer(true);
        if cfg!(debug_assertions) {
            gl_attr.set_context_flags().debug().set();
        }

        // No `.resizable()`: the size is fixed from the user's side.
        let window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .position_centered()
            .build()
            .map_err(|e| Error::WindowCreation(e.to_string()))?;
        let gl_context = window
            .gl_create_context()
            .map_err(Error::WindowCreation)?;
        window
            .gl_make_current(&gl_context)
            .map_err(Error::WindowCreation)?;

        let interval = if config.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("could not set the swap interval (vsync: {}): {e}", config.vsync);
        }

        #[allow(unused_mut)]
        let mut gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        #[cfg(debug_assertions)]
        install_debug_callback(&mut gl);

        let event_pump = sdl.event_pump().map_err(Error::WindowingInit)?;

        log::info!(
            "created {}x{} window {:?} (id {})",
            config.width,
            config.height,
            config.title,
            window.id()
        );

        Ok((
            Self {
                _gl_context: gl_context,
                window,
                event_pump,
                _video_subsystem: video_subsystem,
                _sdl: sdl,
            },
            Arc::new(gl),
        ))
    }

    /// The SDL id every event for this window carries.
    pub fn id(&self) -> u32 {
        self.window.id()
    }

    /// Size of the drawable surface in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }

    /// Drains the event queue and returns the signals addressed to this window.
    pub fn poll_signals(&mut self) -> Vec<WindowSignal> {
        let id = self.window.id();
        self.event_pump
            .poll_iter()
            .filter_map(|event| route_event(id, &event))
            .collect()
    }
}

/// Whether a debug message of `severity` is worth reporting.
pub fn should_report(severity: u32) -> bool {
    severity != glow::DEBUG_SEVERITY_NOTIFICATION
}

#[cfg(debug_assertions)]
fn install_debug_callback(gl: &mut glow::Context) {
    use glow::HasContext;

    if !gl.supports_debug() {
        log::debug!("GL debug output is not available on this context");
        return;
    }
    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.debug_message_callback(|_source, _kind, id, severity, message| {
            if should_report(severity) {
                log::error!(target: "gl", "GL error {id}: {message}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_event(window_id: u32, win_event: WindowEvent) -> Event {
        Event::Window {
            timestamp: 0,
            window_id,
            win_event,
        }
    }

    #[test]
    fn quit_closes_every_window() {
        assert_eq!(
            route_event(7, &Event::Quit { timestamp: 0 }),
            Some(WindowSignal::CloseRequested)
        );
    }

    #[test]
    fn size_changes_are_routed_to_their_window() {
        let event = window_event(1, WindowEvent::SizeChanged(640, 480));
        assert_eq!(
            route_event(1, &event),
            Some(WindowSignal::FramebufferResized)
        );
        assert_eq!(route_event(2, &event), None);
    }

    #[test]
    fn close_only_applies_to_its_window() {
        let event = window_event(3, WindowEvent::Close);
        assert_eq!(route_event(3, &event), Some(WindowSignal::CloseRequested));
        assert_eq!(route_event(4, &event), None);
    }

    #[test]
    fn other_window_events_are_ignored() {
        assert_eq!(route_event(1, &window_event(1, WindowEvent::FocusGained)), None);
        assert_eq!(route_event(1, &window_event(1, WindowEvent::Resized(10, 10))), None);
    }

    #[test]
    fn handle_clones_share_the_close_flag() {
        let handle = WindowHandle::default();
        let observer = handle.clone();
        assert!(!observer.should_close());
        handle.request_close();
        assert!(observer.should_close());
    }

    #[test]
    fn notifications_are_not_reported() {
        assert!(!should_report(glow::DEBUG_SEVERITY_NOTIFICATION));
        assert!(should_report(glow::DEBUG_SEVERITY_HIGH));
        assert!(should_report(glow::DEBUG_SEVERITY_LOW));
    }
}
