//! Output buffers of the extraction stage.

use isosurface_core::{BufferSizes, IndirectDrawArgs};

use crate::buffer::create_sized_buffer;
use crate::error::RenderResult;

/// Worst-case sized mesh buffers for one grid resolution.
///
/// Positions, normals and colors hold three tightly packed `f32` per vertex
/// and double as vertex buffers; `indirect` is read by `draw_indexed_indirect`.
pub struct MeshBuffers {
    pub positions: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub colors: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub indirect: wgpu::Buffer,
    /// Running count of emitted vertices.
    pub vertex_cursor: wgpu::Buffer,
    sizes: BufferSizes,
}

impl MeshBuffers {
    /// Allocates every buffer; fails when one would exceed the device limits.
    pub fn new(device: &wgpu::Device, sizes: BufferSizes) -> RenderResult<Self> {
        let vertex_usage = wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC;
        let index_usage =
            wgpu::BufferUsages::INDEX | wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC;

        let positions = create_sized_buffer(device, "positions", sizes.vertex_buffer_bytes(), vertex_usage)?;
        let normals = create_sized_buffer(device, "normals", sizes.vertex_buffer_bytes(), vertex_usage)?;
        let colors = create_sized_buffer(device, "colors", sizes.vertex_buffer_bytes(), vertex_usage)?;
        let indices = create_sized_buffer(device, "indices", sizes.index_buffer_bytes(), index_usage)?;
        let indirect = create_sized_buffer(
            device,
            "indirect draw args",
            IndirectDrawArgs::SIZE,
            wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        )?;
        let vertex_cursor = create_sized_buffer(
            device,
            "vertex cursor",
            4,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        )?;

        Ok(Self {
            positions,
            normals,
            colors,
            indices,
            indirect,
            vertex_cursor,
            sizes,
        })
    }

    /// Sizes the buffers were allocated for.
    #[must_use]
    pub fn sizes(&self) -> BufferSizes {
        self.sizes
    }

    /// Resets the draw count and the vertex cursor before an extraction.
    ///
    /// The indirect write lands before any command buffer submitted after
    /// this call, including the one `encoder` is recording.
    pub fn reset(&self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) {
        queue.write_buffer(&self.indirect, 0, bytemuck::bytes_of(&IndirectDrawArgs::RESET));
        encoder.clear_buffer(&self.vertex_cursor, 0, None);
    }
}
