//! Parameter loading tests; these need no GPU.

use std::path::PathBuf;

use isosurface::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("isosurface-{}-{name}", std::process::id()))
}

#[test]
fn load_params_defaults_without_path() {
    let surface: SurfaceParams = load_params(None).unwrap();
    assert_eq!(surface, SurfaceParams::default());
    let metaballs: MetaballParams = load_params(None).unwrap();
    assert_eq!(metaballs, MetaballParams::default());
}

#[test]
fn load_params_reads_saved_file() {
    let path = temp_path("surface.json");
    let params = SurfaceParams {
        surface: ImplicitSurface::Gyroid,
        resolution: 48,
        isolevel: 0.25,
        ..SurfaceParams::default()
    };
    params.to_json_file(&path).unwrap();

    let loaded: SurfaceParams = load_params(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, params);

    let scene = SurfaceScene::implicit(loaded).unwrap();
    assert_eq!(scene.resolution(), 48);
    assert_eq!(scene.surface(), Some(ImplicitSurface::Gyroid));
}

#[test]
fn load_params_reports_missing_and_malformed_files() {
    let missing = temp_path("missing.json");
    assert!(load_params::<MetaballParams>(Some(&missing)).is_err());

    let malformed = temp_path("malformed.json");
    std::fs::write(&malformed, "{ \"resolution\": ").unwrap();
    let result = load_params::<MetaballParams>(Some(&malformed));
    std::fs::remove_file(&malformed).unwrap();
    assert!(result.is_err());
}

#[test]
fn loaded_params_are_validated_by_scene() {
    let params = MetaballParams {
        resolution: 1,
        ..MetaballParams::default()
    };
    assert!(SurfaceScene::metaballs(params, Some(1)).is_err());
}
