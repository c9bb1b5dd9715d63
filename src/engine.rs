//! The top level frame loop.

use crate::{
    abs::WindowHandle,
    config::Config,
    error::{Error, Result},
    renderer::Renderer,
    timing::{Clock, FrameTimer, SystemClock},
};

/// What the [`Engine`] drives once per frame.
pub trait FrameRenderer {
    /// Renders and presents one frame advanced by `dt` seconds.
    fn draw(&mut self, dt: f32);

    /// Handle whose close request ends the loop.
    fn window(&self) -> WindowHandle;
}

impl FrameRenderer for Renderer {
    fn draw(&mut self, dt: f32) {
        Renderer::draw(self, dt);
    }

    fn window(&self) -> WindowHandle {
        Renderer::window(self)
    }
}

/// Owns the renderer and runs it until its window is asked to close.
pub struct Engine<R: FrameRenderer = Renderer, C: Clock = SystemClock> {
    renderer: R,
    window: Option<WindowHandle>,
    timer: FrameTimer<C>,
}

impl Engine {
    /// Builds the renderer described by `config` and starts the frame clock.
    pub fn new(config: &Config) -> Result<Self> {
        let renderer = Renderer::new(config)?;
        Ok(Self::with_renderer(renderer, SystemClock::new()))
    }
}

impl<R: FrameRenderer, C: Clock> Engine<R, C> {
    pub fn with_renderer(renderer: R, clock: C) -> Self {
        Self {
            renderer,
            window: None,
            timer: FrameTimer::new(clock),
        }
    }

    /// Grabs the window handle the loop watches.
    pub fn init(&mut self) {
        self.window = Some(self.renderer.window());
    }

    /// Draws frames until the window reports it should close.
    pub fn run(&mut self) -> Result<()> {
        let window = self.window.clone().ok_or(Error::NotInitialized)?;
        while !window.should_close() {
            let dt = self.timer.update_dt();
            self.renderer.draw(dt);
        }
        log::info!("window closed, leaving the frame loop");
        Ok(())
    }

    /// Forgets the window handle. The renderer itself lives until the engine drops.
    pub fn shut_down(&mut self) {
        self.window = None;
    }

    /// Frame rate over the last full interval.
    pub fn fps(&self) -> f32 {
        self.timer.fps()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::tests::ManualClock;

    /// Stands in for the window system: asks to close after `frames_until_close` polls.
    struct FakeRenderer {
        handle: WindowHandle,
        frames_until_close: usize,
        dts: Vec<f32>,
        clock: ManualClock,
        frame_time: f64,
    }

    impl FakeRenderer {
        fn new(frames_until_close: usize, clock: ManualClock) -> Self {
            Self {
                handle: WindowHandle::default(),
                frames_until_close,
                dts: Vec::new(),
                clock,
                frame_time: 0.0,
            }
        }
    }

    impl FrameRenderer for FakeRenderer {
        fn draw(&mut self, dt: f32) {
            self.dts.push(dt);
            self.frame_time += 0.016;
            self.clock.set(self.frame_time);
            if self.dts.len() >= self.frames_until_close {
                self.handle.request_close();
            }
        }

        fn window(&self) -> WindowHandle {
            self.handle.clone()
        }
    }

    #[test]
    fn close_on_first_poll_draws_exactly_once() {
        let clock = ManualClock::default();
        let mut engine = Engine::with_renderer(FakeRenderer::new(1, clock.clone()), clock);

        engine.init();
        engine.run().unwrap();

        assert_eq!(engine.renderer().dts.len(), 1);
    }

    #[test]
    fn frames_get_the_clock_delta() {
        let clock = ManualClock::default();
        let mut engine = Engine::with_renderer(FakeRenderer::new(4, clock.clone()), clock);

        engine.init();
        engine.run().unwrap();

        let dts = &engine.renderer().dts;
        assert_eq!(dts.len(), 4);
        assert_eq!(dts[0], 0.0);
        assert!(dts[1..].iter().all(|dt| (dt - 0.016).abs() < 1e-6));
    }

    #[test]
    fn run_before_init_fails() {
        let clock = ManualClock::default();
        let mut engine = Engine::with_renderer(FakeRenderer::new(1, clock.clone()), clock);

        assert!(matches!(engine.run(), Err(Error::NotInitialized)));
        assert!(engine.renderer().dts.is_empty());
    }

    #[test]
    fn shut_down_forgets_the_window() {
        let clock = ManualClock::default();
        let mut engine = Engine::with_renderer(FakeRenderer::new(1, clock.clone()), clock);

        engine.init();
        engine.run().unwrap();
        engine.shut_down();

        assert!(matches!(engine.run(), Err(Error::NotInitialized)));
    }
}
