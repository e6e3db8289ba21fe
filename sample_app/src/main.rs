//! Headless sample scene
//!
//! Builds a camera object with fly controls, a falling cube and a ground
//! plane, then runs the engine loop for a fixed duration and reports where
//! the cube came to rest.
//!
//! Usage: `sample_scene [seconds] [config.toml|config.ron]`

use std::sync::Arc;
use std::time::Duration;

use bracket_engine::foundation::logging;
use bracket_engine::prelude::*;
use bracket_scripts::CameraControls;

/// Errors that end the sample before the loop starts
#[derive(thiserror::Error, Debug)]
enum SampleError {
    #[error("Invalid duration {0:?}")]
    Duration(String),

    #[error(transparent)]
    Config(#[from] bracket_engine::config::ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

struct SampleScene {
    duration: Duration,
    renderer: RecordingRenderer,
    cube: Option<EntityId>,
}

impl SampleScene {
    fn new(duration: Duration, renderer: RecordingRenderer) -> Self {
        Self {
            duration,
            renderer,
            cube: None,
        }
    }
}

impl Application for SampleScene {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Building sample scene");

        let mut camera = Camera::default();
        camera.set_position(Vec3::new(0.0, 2.0, 8.0));
        engine.set_camera(camera);
        engine.add_game_object(Entity::named("camera").with_component(CameraControls::new()));

        let cube_mesh = Arc::new(MeshData::cube("cube"));
        let cube = engine.add_game_object(
            Entity::named("cube")
                .with_position(Vec3::new(0.0, 4.0, 0.0))
                .with_rotation(Vec3::new(0.3, 0.0, 0.2))
                .with_body(BodyDesc::new(BodyShape::cuboid(0.5, 0.5, 0.5), 1.0))
                .with_component(
                    MeshComponent::new(Arc::clone(&cube_mesh)).with_material(Material::new().with_color(0.8, 0.3, 0.2)),
                ),
        );
        self.cube = Some(cube);

        engine.add_game_object(
            Entity::named("ground")
                .with_position(Vec3::new(0.0, -0.5, 0.0))
                .with_scale(Vec3::new(20.0, 1.0, 20.0))
                .with_body(
                    BodyDesc::fixed(BodyShape::cuboid(10.0, 0.5, 10.0))
                        .with_collision(CollisionLayers::ENVIRONMENT, CollisionLayers::ALL),
                )
                .with_component(MeshComponent::new(cube_mesh).with_material(Material::new().with_color(0.4, 0.6, 0.4))),
        );
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if engine.now() >= self.duration {
            engine.stop();
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(transform) = self.cube.and_then(|cube| engine.transform(cube)) {
            log::info!(
                "Cube rests at ({:.2}, {:.2}, {:.2})",
                transform.position.x,
                transform.position.y,
                transform.position.z
            );
        }
        log::info!(
            "Rendered {} frames ({} kept), last FPS {:.0}",
            engine.frame_count(),
            self.renderer.frame_count(),
            engine.fps()
        );
    }
}

fn parse_duration(arg: Option<String>) -> Result<Duration, SampleError> {
    match arg {
        None => Ok(Duration::from_secs(3)),
        Some(text) => text
            .parse::<f32>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
            .ok_or(SampleError::Duration(text)),
    }
}

fn run() -> Result<(), SampleError> {
    let mut args = std::env::args().skip(1);
    let duration = parse_duration(args.next())?;
    let config = match args.next() {
        Some(path) => EngineConfig::load_from_file(&path)?,
        None => EngineConfig::default(),
    };

    logging::init(&config.logging.level);
    log::info!("Running sample scene for {:.1}s", duration.as_secs_f32());

    let renderer = RecordingRenderer::new(16).with_viewport(1280, 720);
    let mut engine = Engine::new(config)?.with_renderer(renderer.clone());
    let mut scene = SampleScene::new(duration, renderer);
    engine.run(&mut scene)?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("sample_scene: {err}");
        std::process::exit(1);
    }
}
