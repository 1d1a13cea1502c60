//! Indirect rendering of the extracted mesh.

use glam::{Mat3, Mat4, Vec3};
use isosurface_core::LightingParams;

use crate::buffer::create_uniform_buffer;
use crate::camera::Camera;
use crate::engine::DEPTH_FORMAT;
use crate::mesh_buffers::MeshBuffers;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// Per-frame scene uniforms. Layout matches `SceneUniforms` in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
    pub light_direction: [f32; 4],
    pub specular_color: [f32; 4],
    /// Ambient, diffuse, specular, shininess.
    pub material: [f32; 4],
}

impl SceneUniforms {
    #[must_use]
    pub fn new(camera: &Camera, model: Mat4, lighting: &LightingParams) -> Self {
        let normal_matrix = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        let light = if lighting.light_direction.length_squared() > 0.0 {
            lighting.light_direction.normalize()
        } else {
            Vec3::NEG_Y
        };
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            eye_position: camera.position.extend(1.0).to_array(),
            light_direction: light.extend(0.0).to_array(),
            specular_color: lighting.specular_color.extend(1.0).to_array(),
            material: [
                lighting.ambient,
                lighting.diffuse,
                lighting.specular,
                lighting.shininess,
            ],
        }
    }
}

/// Model matrix mapping the sampled domain onto the unit cube, then rotating it.
#[must_use]
pub fn model_matrix(rotation: Vec3, half_extent: f32) -> Mat4 {
    Mat4::from_euler(glam::EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
        * Mat4::from_scale(Vec3::splat(1.0 / half_extent))
}

/// Blinn-Phong render pipeline drawing [`MeshBuffers`] indirectly.
pub struct SurfaceRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SurfaceRenderer {
    #[must_use]
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/surface.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Surface Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let attribute = |attributes: &'static [wgpu::VertexAttribute]| wgpu::VertexBufferLayout {
            array_stride: 3 * std::mem::size_of::<f32>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Surface Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    attribute(&POSITION_ATTRIBUTES),
                    attribute(&NORMAL_ATTRIBUTES),
                    attribute(&COLOR_ATTRIBUTES),
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = create_uniform_buffer(
            device,
            &SceneUniforms::new(&Camera::default(), Mat4::IDENTITY, &LightingParams::default()),
            Some("Scene Uniforms"),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Surface Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &SceneUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draws whatever the last extraction produced; the index count comes from
    /// the indirect buffer.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, mesh: &MeshBuffers) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.positions.slice(..));
        render_pass.set_vertex_buffer(1, mesh.normals.slice(..));
        render_pass.set_vertex_buffer(2, mesh.colors.slice(..));
        render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed_indirect(&mesh.indirect, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_uniforms_layout() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 256);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn test_model_matrix_normalizes_domain() {
        let m = model_matrix(Vec3::ZERO, 4.0);
        let p = m.transform_point3(Vec3::new(4.0, -4.0, 2.0));
        assert!((p - Vec3::new(1.0, -1.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_undoes_uniform_scale() {
        let camera = Camera::default();
        let u = SceneUniforms::new(&camera, model_matrix(Vec3::ZERO, 2.0), &LightingParams::default());
        let n = Mat4::from_cols_array_2d(&u.normal_matrix).transform_vector3(Vec3::Y);
        assert!((n - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        let l = Vec3::new(u.light_direction[0], u.light_direction[1], u.light_direction[2]);
        assert!((l.length() - 1.0).abs() < 1e-5);
    }
}
