//! The full GPU isosurface pipeline: field, extraction and indirect draw.

use isosurface_core::metaball::GpuMetaball;
use isosurface_core::Grid;

use crate::engine::RenderEngine;
use crate::error::RenderResult;
use crate::extraction_pass::{ExtractionPass, ExtractionUniforms};
use crate::field_pass::{FieldPass, FieldSource, FieldUniforms};
use crate::resize::ResizeController;
use crate::resources::GridResources;
use crate::surface_render::{SceneUniforms, SurfaceRenderer};

/// Default clear color behind the surface.
pub const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.08,
    a: 1.0,
};

/// Per-frame inputs of one mesh regeneration.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInputs<'a> {
    pub source: FieldSource,
    pub field: FieldUniforms,
    pub extraction: ExtractionUniforms,
    /// Uploaded only for [`FieldSource::Metaballs`].
    pub metaballs: &'a [GpuMetaball],
}

/// Owns every pipeline and the active grid resources.
pub struct IsosurfaceRenderer {
    field_pass: FieldPass,
    extraction_pass: ExtractionPass,
    resize: ResizeController,
    surface: SurfaceRenderer,
}

impl IsosurfaceRenderer {
    pub fn new(engine: &RenderEngine, grid: Grid) -> RenderResult<Self> {
        let field_pass = FieldPass::new(&engine.device);
        let extraction_pass = ExtractionPass::new(&engine.device, &engine.color_maps);
        let resize = ResizeController::new(&engine.device, grid, &field_pass, &extraction_pass)?;
        let surface = SurfaceRenderer::new(&engine.device, engine.color_format());
        Ok(Self {
            field_pass,
            extraction_pass,
            resize,
            surface,
        })
    }

    /// Schedules a resolution change for the next [`apply_pending_resize`](Self::apply_pending_resize).
    pub fn request_resolution(&mut self, resolution: u32) -> RenderResult<()> {
        self.resize.request(resolution)?;
        Ok(())
    }

    /// Swaps in the resources for a pending resolution, if any.
    pub fn apply_pending_resize(&mut self, device: &wgpu::Device) -> RenderResult<bool> {
        self.resize
            .apply_pending(device, &self.field_pass, &self.extraction_pass)
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.resize.grid()
    }

    #[must_use]
    pub fn resources(&self) -> &GridResources {
        self.resize.resources()
    }

    #[must_use]
    pub fn resize_controller(&self) -> &ResizeController {
        &self.resize
    }

    /// Records a full regeneration of the mesh into `encoder`.
    ///
    /// Uniform resolutions are taken from the active grid. The draw count is
    /// reset first, so the counts never carry over between submissions.
    pub fn encode_generation(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        inputs: &GenerationInputs<'_>,
    ) -> RenderResult<()> {
        let resources = self.resize.resources();
        let grid = resources.grid();

        let mut field = inputs.field;
        field.resolution = grid.resolution();
        let mut extraction = inputs.extraction;
        extraction.resolution = grid.resolution();

        if inputs.source == FieldSource::Metaballs {
            self.field_pass.upload_metaballs(queue, inputs.metaballs)?;
        }
        self.field_pass.update_uniforms(queue, &field);
        self.extraction_pass.update_uniforms(queue, &extraction);

        resources.mesh.reset(queue, encoder);
        self.field_pass
            .record(encoder, inputs.source, &resources.field_bind_group, grid);
        self.extraction_pass
            .record(encoder, &resources.extraction_bind_group, grid);
        Ok(())
    }

    /// Records the indirect surface draw into `color_view`.
    pub fn encode_draw(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        scene: &SceneUniforms,
    ) {
        self.surface.update_uniforms(queue, scene);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Surface Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.surface.draw(&mut render_pass, &self.resize.resources().mesh);
    }
}
