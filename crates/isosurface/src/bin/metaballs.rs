//! Metaball viewer.
//!
//! Usage: `metaballs [params.json]`

use std::path::PathBuf;

use isosurface::{init_logging, load_params, run_app, MetaballParams, Result, SurfaceScene};

fn main() -> Result<()> {
    init_logging();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let params: MetaballParams = load_params(path.as_deref())?;
    log::info!(
        "{} metaballs at resolution {}",
        params.metaball_count,
        params.resolution
    );

    let scene = SurfaceScene::metaballs(params, None)?;
    let title = scene.title();
    run_app(scene, title)
}
