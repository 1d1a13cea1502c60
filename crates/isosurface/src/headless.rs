//! Headless generation API for isosurface-rs.
//!
//! Runs the field, extraction and draw passes without opening a window and
//! reads the results back. Useful for integration tests and for inspecting
//! the generated mesh.

use glam::Vec3;
use pollster::FutureExt;

use isosurface_core::{Grid, IndirectDrawArgs};
use isosurface_render::{read_buffer, IsosurfaceRenderer, RenderEngine, SceneUniforms};

use crate::scene::SurfaceScene;
use crate::{render_error, Result};

/// A mesh copied back from the GPU.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMesh {
    pub draw_args: IndirectDrawArgs,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl HeadlessMesh {
    #[must_use]
    pub fn triangle_count(&self) -> u32 {
        self.draw_args.triangle_count()
    }
}

/// Owns a headless device and the isosurface pipeline.
pub struct HeadlessGenerator {
    engine: RenderEngine,
    renderer: IsosurfaceRenderer,
}

impl HeadlessGenerator {
    /// Creates a headless device rendering `width`×`height` images on `grid`.
    pub fn new(grid: Grid, width: u32, height: u32) -> Result<Self> {
        let engine = RenderEngine::new_headless(width, height)
            .block_on()
            .map_err(render_error)?;
        let renderer = IsosurfaceRenderer::new(&engine, grid).map_err(render_error)?;
        Ok(Self { engine, renderer })
    }

    #[must_use]
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    #[must_use]
    pub fn renderer(&self) -> &IsosurfaceRenderer {
        &self.renderer
    }

    /// Requests `resolution` and applies it at once. Returns whether the
    /// resource set was replaced.
    pub fn set_resolution(&mut self, resolution: u32) -> Result<bool> {
        self.renderer
            .request_resolution(resolution)
            .map_err(render_error)?;
        self.renderer
            .apply_pending_resize(&self.engine.device)
            .map_err(render_error)
    }

    /// Runs one regeneration for `scene` and returns the indirect draw arguments.
    pub fn generate(&mut self, scene: &SurfaceScene) -> Result<IndirectDrawArgs> {
        let mut encoder = self
            .engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Headless Generation Encoder"),
            });
        let inputs = scene.generation_inputs(self.renderer.grid())?;
        self.renderer
            .encode_generation(&self.engine.queue, &mut encoder, &inputs)
            .map_err(render_error)?;
        self.engine.queue.submit(std::iter::once(encoder.finish()));
        self.read_draw_args()
    }

    /// Reads the indirect draw arguments written by the last regeneration.
    pub fn read_draw_args(&self) -> Result<IndirectDrawArgs> {
        let args: Vec<IndirectDrawArgs> = self.read(&self.renderer.resources().mesh.indirect, 1)?;
        Ok(args.first().copied().unwrap_or_default())
    }

    /// Reads the sampled scalar field (`R³` values, x fastest).
    pub fn read_volume(&self) -> Result<Vec<f32>> {
        let resources = self.renderer.resources();
        let count = usize::try_from(resources.sizes().volume_elements).unwrap_or(usize::MAX);
        self.read(&resources.volume, count)
    }

    /// Reads the mesh of the last regeneration, trimmed to the emitted counts.
    pub fn read_mesh(&self) -> Result<HeadlessMesh> {
        let mesh = &self.renderer.resources().mesh;
        let draw_args = self.read_draw_args()?;
        let vertex_count: Vec<u32> = self.read(&mesh.vertex_cursor, 1)?;
        let vertex_count = vertex_count.first().copied().unwrap_or(0) as usize;
        let index_count = draw_args.index_count as usize;

        let as_vec3 = |flat: Vec<f32>| -> Vec<Vec3> {
            flat.chunks_exact(3).map(Vec3::from_slice).collect()
        };

        Ok(HeadlessMesh {
            draw_args,
            positions: as_vec3(self.read(&mesh.positions, vertex_count * 3)?),
            normals: as_vec3(self.read(&mesh.normals, vertex_count * 3)?),
            colors: as_vec3(self.read(&mesh.colors, vertex_count * 3)?),
            indices: self.read(&mesh.indices, index_count)?,
        })
    }

    /// Regenerates, draws one frame and returns it as RGBA pixels, row by row.
    pub fn render_to_image(&mut self, scene: &SurfaceScene) -> Result<Vec<u8>> {
        let target = self
            .engine
            .headless_target
            .as_ref()
            .ok_or_else(|| crate::IsosurfaceError::Render("no headless target".to_string()))?;
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = self.engine.dimensions();

        let mut encoder = self
            .engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Headless Render Encoder"),
            });
        let inputs = scene.generation_inputs(self.renderer.grid())?;
        self.renderer
            .encode_generation(&self.engine.queue, &mut encoder, &inputs)
            .map_err(render_error)?;
        let uniforms = SceneUniforms::new(&self.engine.camera, scene.model_matrix(), scene.lighting());
        self.renderer.encode_draw(
            &self.engine.queue,
            &mut encoder,
            &view,
            &self.engine.depth_view,
            &uniforms,
        );

        // Rows of a texture copy are padded to 256 bytes.
        let unpadded_row = width * 4;
        let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = self.engine.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Headless Image Buffer"),
            size: u64::from(padded_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.engine.queue.submit(std::iter::once(encoder.finish()));

        let padded: Vec<u8> = self.read(&readback, (padded_row * height) as usize)?;
        let pixels = padded
            .chunks_exact(padded_row as usize)
            .flat_map(|row| &row[..unpadded_row as usize])
            .copied()
            .collect();
        Ok(pixels)
    }

    fn read<T: bytemuck::Pod>(&self, buffer: &wgpu::Buffer, count: usize) -> Result<Vec<T>> {
        read_buffer(&self.engine.device, &self.engine.queue, buffer, count).map_err(render_error)
    }
}
