//! The per-resolution GPU resource set.

use isosurface_core::{BufferSizes, Grid};

use crate::buffer::create_sized_buffer;
use crate::error::RenderResult;
use crate::extraction_pass::ExtractionPass;
use crate::field_pass::FieldPass;
use crate::mesh_buffers::MeshBuffers;

/// Everything whose size depends on the grid resolution, plus the bind
/// groups referencing it. Replaced as a whole on resize.
pub struct GridResources {
    grid: Grid,
    pub volume: wgpu::Buffer,
    pub mesh: MeshBuffers,
    pub field_bind_group: wgpu::BindGroup,
    pub extraction_bind_group: wgpu::BindGroup,
}

impl GridResources {
    /// Allocates the volume and mesh buffers for `grid` and binds them to both passes.
    pub fn new(
        device: &wgpu::Device,
        grid: Grid,
        field_pass: &FieldPass,
        extraction_pass: &ExtractionPass,
    ) -> RenderResult<Self> {
        let sizes = grid.buffer_sizes();
        let mesh = MeshBuffers::new(device, sizes)?;
        let volume = create_sized_buffer(
            device,
            "volume",
            sizes.volume_buffer_bytes(),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        )?;

        let field_bind_group = field_pass.create_bind_group(device, &volume);
        let extraction_bind_group = extraction_pass.create_bind_group(device, &volume, &mesh);

        log::debug!(
            "allocated grid resources for R={} ({} bytes)",
            grid.resolution(),
            sizes.total_bytes()
        );

        Ok(Self {
            grid,
            volume,
            mesh,
            field_bind_group,
            extraction_bind_group,
        })
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[must_use]
    pub fn sizes(&self) -> BufferSizes {
        self.mesh.sizes()
    }
}
