//! Core types for isosurface-rs.
//!
//! This crate holds everything that does not touch the GPU:
//! - [`Grid`] and the [`BufferSizes`] derived from the resolution
//! - marching-cubes lookup tables and per-cell triangulation
//! - the implicit surface catalog and the metaball field and dynamics
//! - serializable parameter sets

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Grid math moves between u32 indices and f32 positions
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod colormap;
pub mod error;
pub mod field;
pub mod grid;
pub mod implicit;
pub mod indirect;
pub mod marching_cubes;
pub mod metaball;
pub mod params;
pub mod tables;

pub use colormap::{colormap_id, colormap_name, colormap_parameter, ColormapAxis, COLORMAP_NAMES};
pub use error::{IsosurfaceError, Result};
pub use field::{central_difference, sample_volume, ScalarField};
pub use grid::{BufferSizes, Grid, MAX_RESOLUTION, MIN_RESOLUTION};
pub use implicit::{ImplicitField, ImplicitSurface};
pub use indirect::IndirectDrawArgs;
pub use metaball::{GpuMetaball, Metaball, MetaballField, MetaballSystem};
pub use params::{ColoringParams, JsonConfig, LightingParams, MetaballParams, SurfaceParams};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec3, Vec3};
