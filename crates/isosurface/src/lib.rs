//! isosurface-rs: real-time GPU marching cubes.
//!
//! A scalar field (one of the implicit surfaces of the catalog, or a cloud
//! of moving metaballs) is sampled on an `R³` grid by a compute pass, a second
//! compute pass extracts the isosurface with table-driven marching cubes and
//! compacts the triangles with atomic counters, and the mesh is drawn with an
//! indirect indexed draw whose count the extraction pass wrote.
//!
//! # Quick Start
//!
//! ```no_run
//! use isosurface::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!     let scene = SurfaceScene::implicit(SurfaceParams {
//!         surface: ImplicitSurface::Torus,
//!         ..SurfaceParams::default()
//!     })?;
//!     run_app(scene, "torus")
//! }
//! ```
//!
//! Without a window, [`headless::HeadlessGenerator`] runs the same passes and
//! reads the results back.

pub mod app;
pub mod headless;
pub mod scene;

use std::path::Path;

pub use app::run_app;
pub use scene::{SceneVariant, SurfaceScene};

// Re-export core types
pub use isosurface_core::{
    colormap_id, colormap_name, BufferSizes, ColoringParams, ColormapAxis, GpuMetaball, Grid,
    ImplicitSurface, IndirectDrawArgs, IsosurfaceError, JsonConfig, LightingParams, Mat4,
    MetaballParams, MetaballSystem, Result, SurfaceParams, UVec3, Vec3,
};

// Re-export render types
pub use isosurface_render::{Camera, IsosurfaceRenderer, RenderEngine, RenderError};

/// Converts a GPU error into the application error type.
pub(crate) fn render_error(err: RenderError) -> IsosurfaceError {
    IsosurfaceError::Render(err.to_string())
}

/// Initializes `env_logger` at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Loads parameters from a JSON file, or defaults when no path is given.
pub fn load_params<P>(path: Option<&Path>) -> Result<P>
where
    P: JsonConfig + Default,
{
    match path {
        Some(path) => P::from_json_file(path),
        None => Ok(P::default()),
    }
}
