//! Application window and event loop management.

mod input;
mod render;

use std::sync::Arc;
use std::time::Instant;

use winit::event_loop::EventLoop;
use winit::window::Window;

use isosurface_render::{IsosurfaceRenderer, RenderEngine};
use isosurface_ui::EguiIntegration;

use crate::scene::SurfaceScene;
use crate::{IsosurfaceError, Result};

/// Radians of orbit per pixel of mouse drag.
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Camera distance per wheel line.
const ZOOM_PER_LINE: f32 = 0.25;
/// Camera distance per pixel of touchpad scroll.
const ZOOM_PER_PIXEL: f32 = 0.01;

/// The viewer application state.
pub struct App {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    egui: Option<EguiIntegration>,
    renderer: Option<IsosurfaceRenderer>,
    scene: SurfaceScene,
    title: String,
    // Mouse state for camera control
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    last_frame_time: Option<Instant>,
    /// First fatal error; returned from [`run_app`] once the loop exits.
    error: Option<IsosurfaceError>,
}

impl App {
    /// Creates the application for `scene`; the window opens on resume.
    #[must_use]
    pub fn new(scene: SurfaceScene, title: impl Into<String>) -> Self {
        Self {
            window: None,
            engine: None,
            egui: None,
            renderer: None,
            scene,
            title: title.into(),
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            last_frame_time: None,
            error: None,
        }
    }

    #[must_use]
    pub fn scene(&self) -> &SurfaceScene {
        &self.scene
    }

    fn fail(&mut self, event_loop: &winit::event_loop::ActiveEventLoop, err: IsosurfaceError) {
        log::error!("{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }
}

/// Opens a window and runs `scene` until the window is closed.
pub fn run_app(scene: SurfaceScene, title: impl Into<String>) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| IsosurfaceError::Render(format!("event loop: {e}")))?;
    let mut app = App::new(scene, title);

    event_loop
        .run_app(&mut app)
        .map_err(|e| IsosurfaceError::Render(format!("event loop: {e}")))?;

    app.error.map_or(Ok(()), Err)
}
