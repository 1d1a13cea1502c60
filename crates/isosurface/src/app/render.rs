use std::time::Instant;

use egui_wgpu::ScreenDescriptor;
use winit::event_loop::ActiveEventLoop;

use isosurface_render::{RenderError, SceneUniforms};

use super::App;
use crate::render_error;

impl App {
    /// Regenerates the mesh, draws it and paints the UI on top.
    pub(super) fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame_time = Some(now);

        let (Some(window), Some(engine), Some(egui), Some(renderer)) = (
            &self.window,
            &mut self.engine,
            &mut self.egui,
            &mut self.renderer,
        ) else {
            return;
        };

        let scene = &mut self.scene;
        let mut response = isosurface_ui::ParamsResponse::default();
        let ui_output = egui.run(window, |ctx| response = scene.ui(ctx));

        if response.resolution_changed {
            if let Err(e) = renderer.request_resolution(scene.resolution()) {
                log::warn!("ignoring resolution {}: {e}", scene.resolution());
                scene.set_resolution(renderer.grid().resolution());
            }
        }
        if let Err(e) = renderer.apply_pending_resize(&engine.device) {
            log::warn!("resize failed: {e}");
            scene.set_resolution(renderer.grid().resolution());
        }
        if let Err(e) = scene.sync_metaball_count() {
            log::warn!("{e}");
        }
        scene.advance(dt);

        let frame = match engine.acquire_frame() {
            Ok(frame) => frame,
            Err(RenderError::SurfaceLost | RenderError::SurfaceOutdated) => return,
            Err(RenderError::OutOfMemory) => {
                log::error!("out of GPU memory");
                self.error = Some(render_error(RenderError::OutOfMemory));
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let generated = scene
            .generation_inputs(renderer.grid())
            .and_then(|inputs| {
                renderer
                    .encode_generation(&engine.queue, &mut encoder, &inputs)
                    .map_err(render_error)
            });
        if let Err(e) = generated {
            log::warn!("mesh regeneration skipped: {e}");
        }

        let uniforms = SceneUniforms::new(&engine.camera, scene.model_matrix(), scene.lighting());
        renderer.encode_draw(
            &engine.queue,
            &mut encoder,
            &view,
            &engine.depth_view,
            &uniforms,
        );

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [engine.width, engine.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        egui.render(
            &engine.device,
            &engine.queue,
            &mut encoder,
            &view,
            &screen_descriptor,
            ui_output,
        );

        engine.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
