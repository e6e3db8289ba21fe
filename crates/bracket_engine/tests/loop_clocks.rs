//! Dual-clock scheduling, stop semantics and frame submission

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use bracket_engine::prelude::*;

struct NoopApp;

impl Application for NoopApp {
    fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        Ok(())
    }

    fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {}
}

#[derive(Clone, Default)]
struct Counters {
    updates: Arc<AtomicUsize>,
    fixed: Arc<AtomicUsize>,
}

struct Counting(Counters);

impl Component for Counting {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Custom("counting")
    }

    fn update(&mut self, _ctx: &mut Context<'_>, _dt: f32) {
        self.0.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn fixed_update(&mut self, _ctx: &mut Context<'_>) {
        self.0.fixed.fetch_add(1, Ordering::SeqCst);
    }
}

fn engine(clock: &ManualClock) -> Engine {
    Engine::new(EngineConfig::default()).unwrap().with_clock(clock.clone())
}

#[test]
fn test_poll_fires_each_clock_when_due() {
    let clock = ManualClock::new();
    let counters = Counters::default();
    let mut engine = engine(&clock);
    engine.add_game_object(Entity::named("counter").with_component(Counting(counters.clone())));
    engine.start();

    // Variable clock is due immediately, fixed clock one step later
    assert_eq!(engine.poll(&mut NoopApp).unwrap(), 1);
    assert_eq!(counters.updates.load(Ordering::SeqCst), 1);
    assert_eq!(counters.fixed.load(Ordering::SeqCst), 0);

    clock.advance_millis(20);
    assert_eq!(engine.poll(&mut NoopApp).unwrap(), 2);
    assert_eq!(counters.fixed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_late_fixed_tick_fires_once_without_catch_up() {
    let clock = ManualClock::new();
    let counters = Counters::default();
    let mut engine = engine(&clock);
    engine.add_game_object(Entity::named("counter").with_component(Counting(counters.clone())));
    engine.start();

    clock.advance(Duration::from_millis(500));
    engine.poll(&mut NoopApp).unwrap();
    assert_eq!(counters.fixed.load(Ordering::SeqCst), 1);

    let next = engine.next_fixed_tick().unwrap();
    assert!(next > clock.now());
}

#[test]
fn test_stop_cancels_the_fixed_timer() {
    let clock = ManualClock::new();
    let counters = Counters::default();
    let mut engine = engine(&clock);
    engine.add_game_object(Entity::named("counter").with_component(Counting(counters.clone())));
    engine.start();
    assert!(engine.next_fixed_tick().is_some());

    engine.stop();
    assert!(!engine.is_running());
    assert!(engine.next_fixed_tick().is_none());
    assert!(engine.next_variable_tick().is_none());

    clock.advance(Duration::from_secs(1));
    assert_eq!(engine.poll(&mut NoopApp).unwrap(), 0);
    assert_eq!(counters.fixed.load(Ordering::SeqCst), 0);
    assert_eq!(counters.updates.load(Ordering::SeqCst), 0);
}

struct StopAfter(u32);

impl Component for StopAfter {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Custom("stop-after")
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) {
        self.0 = self.0.saturating_sub(1);
        if self.0 == 0 {
            ctx.stop();
        }
    }
}

#[test]
fn test_component_can_stop_both_clocks() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.add_game_object(Entity::named("stopper").with_component(StopAfter(3)));
    engine.start();

    for _ in 0..3 {
        clock.advance_millis(17);
        engine.poll(&mut NoopApp).unwrap();
    }
    assert!(!engine.is_running());
    assert!(engine.next_deadline().is_none());
}

struct Hover;

impl Component for Hover {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Custom("hover")
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) {
        let Some(handle) = ctx.body_handle() else {
            return;
        };
        // Cancels the default gravity for a 1 kg body
        ctx.apply_force(handle, Vec3::new(0.0, 9.82, 0.0));
    }
}

#[test]
fn test_forces_from_fixed_update_apply_to_the_same_step() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    let id = engine.add_game_object(
        Entity::named("hover")
            .with_position(Vec3::new(0.0, 3.0, 0.0))
            .with_body(BodyDesc::new(BodyShape::sphere(0.5), 1.0))
            .with_component(Hover),
    );
    engine.start();

    for _ in 0..60 {
        engine.fixed_tick();
    }
    engine.variable_tick();
    assert_relative_eq!(engine.transform(id).unwrap().position.y, 3.0, epsilon = 1e-4);
}

#[test]
fn test_frames_reach_the_renderer_with_viewport_aspect() {
    let clock = ManualClock::new();
    let renderer = RecordingRenderer::new(8).with_viewport(800, 600);
    let mut engine = engine(&clock).with_renderer(renderer.clone());
    engine.set_camera(Camera::default());
    let cube = engine.add_game_object(
        Entity::named("cube")
            .with_position(Vec3::new(0.0, 1.0, 0.0))
            .with_component(MeshComponent::new(Arc::new(MeshData::cube("cube")))),
    );
    engine.start();

    engine.variable_tick();
    engine.variable_tick();

    assert_eq!(renderer.frame_count(), 2);
    let frame = renderer.last_frame().unwrap();
    assert_eq!(frame.frame, 2);
    assert_relative_eq!(frame.camera.as_ref().unwrap().aspect, 800.0 / 600.0);
    assert_eq!(frame.instances_of(cube).count(), 1);
    assert!(engine.listener().is_some());
}

#[test]
fn test_listener_waits_for_a_camera() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start();

    engine.variable_tick();
    assert!(engine.listener().is_none());

    engine.set_camera(Camera::default());
    engine.variable_tick();
    let first = engine.listener().cloned().unwrap();

    engine.camera_mut().unwrap().set_position(Vec3::new(0.0, 0.0, 9.0));
    engine.variable_tick();
    let listener = engine.listener().unwrap();
    assert_eq!(listener.position, Vec3::new(0.0, 0.0, 9.0));
    assert_eq!(listener.volume, first.volume);
}

#[test]
fn test_fps_sink_updates_once_a_second() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start();

    for _ in 0..70 {
        engine.variable_tick();
        clock.advance_millis(16);
    }
    let text = engine.hud().text("fps").unwrap();
    assert!(text.starts_with("FPS: "), "unexpected fps text {text:?}");
    assert!(engine.fps() > 50.0 && engine.fps() < 70.0);
}

#[test]
fn test_variable_dt_follows_the_clock() {
    let clock = ManualClock::new();
    let mut engine = engine(&clock);
    engine.start();

    assert_eq!(engine.variable_tick(), 0.0);
    clock.advance_millis(25);
    assert_relative_eq!(engine.variable_tick(), 0.025, epsilon = 1e-6);
}

struct StopOnFrame {
    frames: u32,
    stop_at: u32,
    cleaned_up: bool,
}

impl Application for StopOnFrame {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        engine.set_camera(Camera::default());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        self.frames += 1;
        if self.frames == self.stop_at {
            engine.stop();
        }
        Ok(())
    }

    fn cleanup(&mut self, _engine: &mut Engine) {
        self.cleaned_up = true;
    }
}

#[test]
fn test_run_returns_when_stopped() {
    let mut config = EngineConfig::default();
    config.loop_rates.target_fps = 500.0;
    config.loop_rates.fixed_hz = 500.0;
    let mut engine = Engine::new(config).unwrap();
    let mut app = StopOnFrame {
        frames: 0,
        stop_at: 5,
        cleaned_up: false,
    };

    engine.run(&mut app).unwrap();
    assert_eq!(app.frames, 5);
    assert!(app.cleaned_up);
    assert!(!engine.is_running());
}

struct FailingApp;

impl Application for FailingApp {
    fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        Ok(())
    }

    fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        Err(AppError::Custom("boom".into()))
    }

    fn cleanup(&mut self, _engine: &mut Engine) {}
}

#[test]
fn test_run_returns_application_errors() {
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    let result = engine.run(&mut FailingApp);
    assert!(matches!(result, Err(EngineError::Application(_))));
    assert!(!engine.is_running());
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = EngineConfig::default();
    config.loop_rates.fixed_hz = -1.0;
    assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
}

#[test]
fn test_sub_hertz_rates_are_rejected_before_the_loop_starts() {
    let mut config = EngineConfig::default();
    config.loop_rates.fixed_hz = 1e-25;
    assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));

    let mut config = EngineConfig::default();
    config.loop_rates.target_fps = 1e-25;
    assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
}
