//! Implicit surface viewer.
//!
//! Usage: `implicit-surface [params.json]`

use std::path::PathBuf;

use isosurface::{init_logging, load_params, run_app, Result, SurfaceParams, SurfaceScene};

fn main() -> Result<()> {
    init_logging();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let params: SurfaceParams = load_params(path.as_deref())?;
    log::info!(
        "surface {} at resolution {}",
        params.surface,
        params.resolution
    );

    let scene = SurfaceScene::implicit(params)?;
    let title = scene.title();
    run_app(scene, title)
}
