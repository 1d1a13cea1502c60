//! Scalar field generation.
//!
//! Two compute pipelines share one bind group layout: the implicit catalog
//! evaluator and the metaball summation. Both write `R³` floats into the
//! volume buffer of the current [`GridResources`](crate::resources::GridResources).

use isosurface_core::metaball::{GpuMetaball, MAX_METABALLS};
use isosurface_core::{Grid, ImplicitSurface, IsosurfaceError};

use crate::buffer::{create_uniform_buffer, update_buffer};
use crate::error::RenderResult;

/// Invocations per workgroup axis, shared by both compute stages.
pub const WORKGROUP_SIZE: u32 = 4;

/// Uniforms of the field stage. Layout matches `FieldParams` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct FieldUniforms {
    pub resolution: u32,
    pub surface_id: u32,
    pub ball_count: u32,
    pub _pad0: u32,
    pub half_extent: f32,
    pub time: f32,
    pub _padding: [f32; 2],
}

impl FieldUniforms {
    /// Uniforms for evaluating `surface` at animation time `time`.
    #[must_use]
    pub fn implicit(grid: Grid, surface: ImplicitSurface, half_extent: f32, time: f32) -> Self {
        Self {
            resolution: grid.resolution(),
            surface_id: surface.id(),
            ball_count: 0,
            _pad0: 0,
            half_extent,
            time,
            _padding: [0.0; 2],
        }
    }

    /// Uniforms for summing `ball_count` metaballs.
    #[must_use]
    pub fn metaballs(grid: Grid, ball_count: u32, half_extent: f32) -> Self {
        Self {
            resolution: grid.resolution(),
            surface_id: 0,
            ball_count,
            _pad0: 0,
            half_extent,
            time: 0.0,
            _padding: [0.0; 2],
        }
    }
}

/// Which field the volume is filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Implicit,
    Metaballs,
}

/// The field generator pipelines and their shared inputs.
pub struct FieldPass {
    implicit_pipeline: wgpu::ComputePipeline,
    metaball_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    metaball_buffer: wgpu::Buffer,
}

impl FieldPass {
    /// Compiles both field shaders and allocates the uniform and metaball buffers.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Field Bind Group Layout"),
            entries: &[
                // Volume (output)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Metaballs
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Field Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let implicit_pipeline = create_field_pipeline(
            device,
            &pipeline_layout,
            "Implicit Field",
            concat!(
                include_str!("shaders/field_common.wgsl"),
                include_str!("shaders/field_implicit.wgsl")
            ),
        );
        let metaball_pipeline = create_field_pipeline(
            device,
            &pipeline_layout,
            "Metaball Field",
            concat!(
                include_str!("shaders/field_common.wgsl"),
                include_str!("shaders/field_metaball.wgsl")
            ),
        );

        let uniform_buffer = create_uniform_buffer(
            device,
            &FieldUniforms::implicit(Grid::default(), ImplicitSurface::Sphere, 1.0, 0.0),
            Some("Field Uniforms"),
        );
        let metaball_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Metaball Buffer"),
            size: (MAX_METABALLS * std::mem::size_of::<GpuMetaball>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("created field pipelines");

        Self {
            implicit_pipeline,
            metaball_pipeline,
            bind_group_layout,
            uniform_buffer,
            metaball_buffer,
        }
    }

    /// Layout the per-grid field bind group must follow.
    #[must_use]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Binds `volume` together with the shared uniform and metaball buffers.
    #[must_use]
    pub fn create_bind_group(&self, device: &wgpu::Device, volume: &wgpu::Buffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Field Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: volume.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.metaball_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Writes the field uniforms for the next dispatch.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &FieldUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Uploads the packed metaball array.
    pub fn upload_metaballs(&self, queue: &wgpu::Queue, balls: &[GpuMetaball]) -> RenderResult<()> {
        if balls.len() > MAX_METABALLS {
            return Err(IsosurfaceError::TooManyMetaballs {
                count: balls.len(),
                max: MAX_METABALLS,
            }
            .into());
        }
        if !balls.is_empty() {
            update_buffer(queue, &self.metaball_buffer, balls);
        }
        Ok(())
    }

    /// Records the field dispatch covering every sample of `grid`.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: FieldSource,
        bind_group: &wgpu::BindGroup,
        grid: Grid,
    ) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Field Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(match source {
            FieldSource::Implicit => &self.implicit_pipeline,
            FieldSource::Metaballs => &self.metaball_pipeline,
        });
        compute_pass.set_bind_group(0, bind_group, &[]);
        let groups = grid.workgroups(WORKGROUP_SIZE);
        compute_pass.dispatch_workgroups(groups, groups, groups);
    }
}

fn create_field_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    name: &str,
    source: &'static str,
) -> wgpu::ComputePipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{name} Shader")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&format!("{name} Pipeline")),
        layout: Some(layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_uniforms_layout() {
        assert_eq!(std::mem::size_of::<FieldUniforms>(), 32);
        assert_eq!(std::mem::size_of::<FieldUniforms>() % 16, 0);
    }

    #[test]
    fn test_field_uniforms_constructors() {
        let grid = Grid::new(32).unwrap();
        let implicit = FieldUniforms::implicit(grid, ImplicitSurface::Torus, 1.6, 2.5);
        assert_eq!(implicit.resolution, 32);
        assert_eq!(implicit.surface_id, ImplicitSurface::Torus.id());
        assert_eq!(implicit.ball_count, 0);

        let metaballs = FieldUniforms::metaballs(grid, 200, 4.0);
        assert_eq!(metaballs.ball_count, 200);
        assert!((metaballs.half_extent - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_metaball_stride_matches_shader() {
        assert_eq!(std::mem::size_of::<GpuMetaball>(), 32);
    }
}
