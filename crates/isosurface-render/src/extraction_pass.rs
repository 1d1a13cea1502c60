//! Marching-cubes extraction.
//!
//! One invocation per cell. Output slots are reserved with `atomicAdd` on the
//! vertex cursor and on the index count of the indirect draw arguments, so the
//! draw reads exactly the number of indices written.

use isosurface_core::marching_cubes::Interior;
use isosurface_core::tables::{gpu_table, GPU_TABLE_LEN};
use isosurface_core::{ColoringParams, Grid};

use crate::buffer::{create_storage_buffer, create_uniform_buffer, update_buffer};
use crate::color_maps::{ColorMapRegistry, LUT_LEN};
use crate::error::RenderResult;
use crate::field_pass::WORKGROUP_SIZE;
use crate::mesh_buffers::MeshBuffers;

/// Normal orientation for fields whose inside is below the isolevel.
/// A positive sign also makes the shader swap the winding of table rows.
pub const NORMAL_SIGN_BELOW: f32 = Interior::Below.normal_sign();
/// Normal orientation for fields whose inside is above the isolevel.
pub const NORMAL_SIGN_ABOVE: f32 = Interior::Above.normal_sign();

/// Uniforms of the extraction stage. Layout matches `ExtractionParams` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct ExtractionUniforms {
    pub resolution: u32,
    pub colormap_id: u32,
    pub colormap_axis: u32,
    pub colormap_reverse: u32,
    pub isolevel: f32,
    pub half_extent: f32,
    pub normal_sign: f32,
    pub _pad: f32,
}

impl ExtractionUniforms {
    /// Builds the uniforms, resolving the colormap name to its id.
    pub fn new(
        grid: Grid,
        isolevel: f32,
        half_extent: f32,
        coloring: &ColoringParams,
        normal_sign: f32,
    ) -> RenderResult<Self> {
        Ok(Self {
            resolution: grid.resolution(),
            colormap_id: coloring.colormap_id()?,
            colormap_axis: coloring.axis.id(),
            colormap_reverse: u32::from(coloring.reverse),
            isolevel,
            half_extent,
            normal_sign,
            _pad: 0.0,
        })
    }

    fn zeroed_for(grid: Grid) -> Self {
        Self {
            resolution: grid.resolution(),
            colormap_id: 0,
            colormap_axis: 0,
            colormap_reverse: 0,
            isolevel: 0.0,
            half_extent: 1.0,
            normal_sign: NORMAL_SIGN_BELOW,
            _pad: 0.0,
        }
    }
}

/// The extraction pipeline with its grid-independent inputs.
pub struct ExtractionPass {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    tables_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    colormap_buffer: wgpu::Buffer,
}

impl ExtractionPass {
    /// Compiles the shader and uploads the case tables and the colormap LUT.
    #[must_use]
    pub fn new(device: &wgpu::Device, color_maps: &ColorMapRegistry) -> Self {
        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let uniform = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Extraction Bind Group Layout"),
            entries: &[
                storage(0, true),  // tables
                storage(1, true),  // volume
                storage(2, false), // positions
                storage(3, false), // normals
                storage(4, false), // colors
                storage(5, false), // indices
                storage(6, false), // indirect draw args
                storage(7, false), // vertex cursor
                uniform(8),
                uniform(9), // colormap LUT
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Extraction Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Marching Cubes Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/marching_cubes.wgsl").into()),
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Marching Cubes Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let tables = gpu_table();
        debug_assert_eq!(tables.len(), GPU_TABLE_LEN);
        let tables_buffer = create_storage_buffer(device, &tables, Some("Marching Cubes Tables"));

        let lut = color_maps.lut();
        debug_assert_eq!(lut.len(), LUT_LEN);
        let colormap_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Colormap LUT"),
            size: (lut.len() * std::mem::size_of::<[f32; 4]>()) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        colormap_buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytemuck::cast_slice(&lut));
        colormap_buffer.unmap();

        let uniform_buffer = create_uniform_buffer(
            device,
            &ExtractionUniforms::zeroed_for(Grid::default()),
            Some("Extraction Uniforms"),
        );

        log::debug!("created extraction pipeline");

        Self {
            pipeline,
            bind_group_layout,
            tables_buffer,
            uniform_buffer,
            colormap_buffer,
        }
    }

    /// Layout the per-grid extraction bind group must follow.
    #[must_use]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Binds a volume and the mesh buffers sized for the same grid.
    #[must_use]
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        volume: &wgpu::Buffer,
        mesh: &MeshBuffers,
    ) -> wgpu::BindGroup {
        let buffers: [&wgpu::Buffer; 10] = [
            &self.tables_buffer,
            volume,
            &mesh.positions,
            &mesh.normals,
            &mesh.colors,
            &mesh.indices,
            &mesh.indirect,
            &mesh.vertex_cursor,
            &self.uniform_buffer,
            &self.colormap_buffer,
        ];
        let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
            .iter()
            .zip(0u32..)
            .map(|(buffer, binding)| wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Extraction Bind Group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Writes the extraction uniforms for the next dispatch.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &ExtractionUniforms) {
        update_buffer(queue, &self.uniform_buffer, std::slice::from_ref(uniforms));
    }

    /// Records the extraction dispatch covering every cell of `grid`.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup, grid: Grid) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Marching Cubes Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        let groups = grid.cells_per_axis().div_ceil(WORKGROUP_SIZE);
        compute_pass.dispatch_workgroups(groups, groups, groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isosurface_core::ColormapAxis;

    #[test]
    fn test_extraction_uniforms_layout() {
        assert_eq!(std::mem::size_of::<ExtractionUniforms>(), 32);
        assert_eq!(std::mem::size_of::<ExtractionUniforms>() % 16, 0);
    }

    #[test]
    fn test_extraction_uniforms_resolve_colormap() {
        let coloring = ColoringParams {
            colormap: "ocean".to_string(),
            axis: ColormapAxis::Radial,
            reverse: true,
        };
        let grid = Grid::new(16).unwrap();
        let u = ExtractionUniforms::new(grid, 20.0, 4.0, &coloring, NORMAL_SIGN_ABOVE).unwrap();
        assert_eq!(u.colormap_id, 22);
        assert_eq!(u.colormap_axis, ColormapAxis::Radial.id());
        assert_eq!(u.colormap_reverse, 1);
        assert!((u.normal_sign + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_colormap_is_rejected() {
        let coloring = ColoringParams {
            colormap: "viridis".to_string(),
            ..ColoringParams::default()
        };
        let grid = Grid::default();
        assert!(ExtractionUniforms::new(grid, 0.0, 1.0, &coloring, NORMAL_SIGN_BELOW).is_err());
    }

    #[test]
    fn test_lut_fits_shader_array() {
        // The shader declares array<vec4<f32>, 1472>.
        assert_eq!(LUT_LEN, 1472);
    }
}
