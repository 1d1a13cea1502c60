//! GPU backend for isosurface-rs.
//!
//! This crate provides the wgpu side of the isosurface pipeline:
//! - device and surface management ([`RenderEngine`])
//! - the scalar field and marching-cubes compute passes
//! - resolution-dependent buffers and their replacement on resize
//! - indirect Blinn-Phong rendering of the extracted mesh

// Buffer sizes and grid coordinates move between u32, u64 and f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod buffer;
pub mod camera;
pub mod color_maps;
pub mod engine;
pub mod error;
pub mod extraction_pass;
pub mod field_pass;
pub mod mesh_buffers;
pub mod renderer;
pub mod resize;
pub mod resources;
pub mod surface_render;

pub use buffer::read_buffer;
pub use camera::Camera;
pub use color_maps::{ColorMap, ColorMapRegistry};
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use extraction_pass::{ExtractionPass, ExtractionUniforms, NORMAL_SIGN_ABOVE, NORMAL_SIGN_BELOW};
pub use field_pass::{FieldPass, FieldSource, FieldUniforms, WORKGROUP_SIZE};
pub use mesh_buffers::MeshBuffers;
pub use renderer::{GenerationInputs, IsosurfaceRenderer, BACKGROUND};
pub use resize::ResizeController;
pub use resources::GridResources;
pub use surface_render::{model_matrix, SceneUniforms, SurfaceRenderer};
