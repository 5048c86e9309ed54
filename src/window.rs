//! Window management using winit

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use winit::{
    dpi::PhysicalSize,
    error::{EventLoopError, OsError},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::{CursorGrabMode, Window as WinitWindow, WindowBuilder},
};

use crate::backend::traits::BackendError;
use crate::backend::wgpu_backend::WgpuBackend;
use crate::engine::{Engine, FrameOutcome};
use crate::SceneConfig;

/// Errors from creating or running the window
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("Failed to create window: {0}")]
    Os(#[from] OsError),

    #[error("Failed to initialize backend: {0}")]
    Backend(#[from] BackendError),
}

/// Wrapper around winit window with additional state
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    close_requested: bool,
}

impl Window {
    /// Create a new window with the given title and dimensions.
    ///
    /// The cursor is hidden and confined to the window.
    pub fn new(
        event_loop: &EventLoop<()>,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self, WindowError> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(event_loop)?,
        );

        let window = Self {
            window,
            width,
            height,
            close_requested: false,
        };
        window.capture_cursor();
        Ok(window)
    }

    /// Hide the cursor and keep it inside the window
    pub fn capture_cursor(&self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(e) = grabbed {
            log::warn!("Cursor grab unavailable: {}", e);
        }
        self.window.set_cursor_visible(false);
    }

    /// Get arc reference to window
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    /// Get current window dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check if close was requested
    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Handle window events
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.width = size.width;
                self.height = size.height;
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Focused(true) => self.capture_cursor(),
            _ => {}
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

/// Open the window and render the scene until it is closed
pub fn run(config: SceneConfig) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height)?;

    let backend = WgpuBackend::new(window.window_arc(), config.vsync)?;
    let mut engine = Engine::new(backend, config);
    engine.prepare();

    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => {
                window.handle_event(&event);
                engine.handle_window_event(&event);

                if window.should_close() {
                    let (width, height) = window.dimensions();
                    log::info!(
                        "Closing after {} frames at {}x{}",
                        engine.frame_count(),
                        width,
                        height
                    );
                    elwt.exit();
                }
            }
            Event::DeviceEvent { event, .. } => engine.handle_device_event(&event),
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                if engine.frame(dt) == FrameOutcome::Exit {
                    log::info!("Exit requested after {} frames", engine.frame_count());
                    elwt.exit();
                }
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
