//! Resource loader against real files on disk

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bracket_engine::assets::{AssetError, MeshFormat, MeshImporter, ResourceLoader};
use bracket_engine::config::AssetConfig;
use bracket_engine::prelude::*;

fn write_png(path: &Path, color: [u8; 4]) {
    image::RgbaImage::from_pixel(2, 2, image::Rgba(color)).save(path).unwrap();
}

fn loader_in(dir: &Path, fallback: &str) -> ResourceLoader {
    ResourceLoader::new(AssetConfig {
        search_paths: vec![dir.to_string_lossy().into_owned()],
        fallback_texture: fallback.to_string(),
    })
}

#[test]
fn test_missing_texture_resolves_to_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Textures/Required")).unwrap();
    write_png(&dir.path().join("Textures/Required/None.png"), [255, 0, 255, 255]);

    let loader = loader_in(dir.path(), "Textures/Required/None.png");
    let texture = loader.load_texture("missing.png").unwrap();
    assert!(texture.is_fallback);
    assert_eq!(&texture.data[0..4], &[255, 0, 255, 255]);
}

#[test]
fn test_present_texture_is_not_the_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("grass.png"), [0, 200, 0, 255]);

    let loader = loader_in(dir.path(), "None.png");
    let texture = loader.load_texture("grass.png").unwrap();
    assert!(!texture.is_fallback);
    assert_eq!((texture.width, texture.height), (2, 2));
}

#[test]
fn test_broken_fallback_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Broken.png"), b"definitely not a png").unwrap();

    let loader = loader_in(dir.path(), "Broken.png");
    match loader.load_texture("missing.png") {
        Err(AssetError::FallbackFailed { path, fallback, .. }) => {
            assert_eq!(path, "missing.png");
            assert_eq!(fallback, "Broken.png");
        }
        other => panic!("expected FallbackFailed, got {other:?}"),
    }
}

#[test]
fn test_background_texture_request_uses_the_same_fallback() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("None.png"), [1, 2, 3, 255]);

    let loader = loader_in(dir.path(), "None.png");
    let texture = loader.request_texture("missing.png").wait().unwrap().unwrap();
    assert!(texture.is_fallback);
}

struct Unreachable;

impl MeshImporter for Unreachable {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
        panic!("scene importer called for {}", path.display());
    }
}

#[test]
fn test_obj_file_is_parsed_by_the_triangle_soup_importer() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("quad.OBJ"),
        "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
    )
    .unwrap();

    let loader = loader_in(dir.path(), "None.png").with_importer(MeshFormat::SceneGraph, Arc::new(Unreachable));
    let mesh = loader.load_mesh("quad.OBJ").unwrap();
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.vertex_count(), 4);
}

#[test]
fn test_mesh_component_draws_once_background_load_finishes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

    let clock = ManualClock::new();
    let renderer = RecordingRenderer::new(4);
    let mut engine = Engine::new(EngineConfig::default())
        .unwrap()
        .with_clock(clock.clone())
        .with_renderer(renderer.clone())
        .with_loader(loader_in(dir.path(), "None.png"));
    let id = engine.add_game_object(Entity::named("tri").with_component(MeshComponent::from_path("tri.obj")));
    engine.start();

    let mut drawn = false;
    for _ in 0..400 {
        engine.variable_tick();
        if renderer.last_frame().is_some_and(|frame| frame.instances_of(id).count() == 1) {
            drawn = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(drawn, "mesh never appeared in a frame");

    let component = engine.get_component(id, ComponentKind::Mesh).unwrap();
    let mesh = component.downcast_ref::<MeshComponent>().unwrap().mesh().unwrap();
    assert_eq!(mesh.triangle_count(), 1);
}

struct Crashing;

impl MeshImporter for Crashing {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
        panic!("importer crashed on {}", path.display());
    }
}

#[test]
fn test_mesh_component_fails_when_the_importer_crashes() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new();
    let loader = loader_in(dir.path(), "None.png").with_importer(MeshFormat::TriangleSoup, Arc::new(Crashing));
    let mut engine = Engine::new(EngineConfig::default())
        .unwrap()
        .with_clock(clock.clone())
        .with_loader(loader);
    let id = engine.add_game_object(Entity::named("broken").with_component(MeshComponent::from_path("broken.obj")));
    engine.start();

    let failed = |engine: &Engine| {
        engine
            .get_component(id, ComponentKind::Mesh)
            .and_then(|c| c.downcast_ref::<MeshComponent>())
            .is_some_and(MeshComponent::load_failed)
    };
    for _ in 0..400 {
        engine.variable_tick();
        if failed(&engine) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(failed(&engine), "mesh stayed in loading after the importer crashed");
}
