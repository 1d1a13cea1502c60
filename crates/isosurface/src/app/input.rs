use std::sync::Arc;

use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use isosurface_core::Grid;
use isosurface_render::{IsosurfaceRenderer, RenderEngine};
use isosurface_ui::EguiIntegration;

use super::{App, ORBIT_SENSITIVITY, ZOOM_PER_LINE, ZOOM_PER_PIXEL};
use crate::{render_error, IsosurfaceError};

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, IsosurfaceError::Render(format!("window: {e}")));
                return;
            }
        };

        let engine = match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(event_loop, render_error(e));
                return;
            }
        };

        let renderer = Grid::new(self.scene.resolution())
            .map_err(Into::into)
            .and_then(|grid| IsosurfaceRenderer::new(&engine, grid));
        let renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, render_error(e));
                return;
            }
        };

        let egui = EguiIntegration::new(&engine.device, engine.color_format(), &window);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.renderer = Some(renderer);
        self.egui = Some(egui);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Track the physical button state even when egui consumes the event,
        // so a release over a panel does not leave the orbit stuck.
        if let WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } = &event
        {
            self.left_mouse_down = *state == ElementState::Pressed;
        }

        let (Some(window), Some(egui)) = (&self.window, &mut self.egui) else {
            return;
        };
        let egui_consumed = egui.handle_event(window, &event);
        let over_ui = egui.wants_pointer();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                    log::info!("window resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (dx, dy) = (position.x - self.mouse_pos.0, position.y - self.mouse_pos.1);
                self.mouse_pos = (position.x, position.y);
                if self.left_mouse_down && !over_ui {
                    if let Some(engine) = &mut self.engine {
                        engine
                            .camera
                            .orbit(dx as f32 * ORBIT_SENSITIVITY, dy as f32 * ORBIT_SENSITIVITY);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } if !egui_consumed && !over_ui => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * ZOOM_PER_LINE,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * ZOOM_PER_PIXEL,
                };
                if let Some(engine) = &mut self.engine {
                    engine.camera.zoom(amount);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render_frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
