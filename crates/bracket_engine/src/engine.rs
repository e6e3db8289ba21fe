//! Core engine implementation
//!
//! The engine owns the world and drives it with two clocks:
//!
//! - the **variable** clock, once per presentation refresh: timers, camera
//!   housekeeping, `update(dt)` with the body bridge, frame submission, the
//!   application hook and the FPS counter;
//! - the **fixed** clock, at `loop.fixed_hz`: timers, `fixed_update()` and
//!   one physics step.
//!
//! The clocks are independent. A late fixed tick fires once and is
//! rescheduled from the current time; there is no catch-up.

use std::time::Duration;

use thiserror::Error;

use crate::application::{AppEvent, Application};
use crate::assets::ResourceLoader;
use crate::audio::AudioListener;
use crate::config::{ConfigError, EngineConfig};
use crate::ecs::{Component, ComponentId, ComponentKind, Entity, EntityId, Transform, World};
use crate::foundation::math::Vec3;
use crate::foundation::time::{FpsCounter, SystemClock, TimeSource, Timer};
use crate::input::InputManager;
use crate::physics::PhysicsWorld;
use crate::render::{Camera, NullRenderer, RenderBackend};
use crate::ui::Hud;

/// Main engine struct
///
/// The engine coordinates the world, the render backend and the two loop
/// clocks.
pub struct Engine {
    config: EngineConfig,
    world: World,
    clock: Box<dyn TimeSource>,
    renderer: Box<dyn RenderBackend>,
    listener: Option<AudioListener>,
    frame_timer: Timer,
    fps: FpsCounter,
    frame: u64,
    running: bool,
    next_variable: Option<Duration>,
    next_fixed: Option<Duration>,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine (fixed {} Hz, target {} fps)",
            config.loop_rates.fixed_hz,
            config.loop_rates.target_fps
        );

        Ok(Self {
            world: World::new(&config),
            config,
            clock: Box::new(SystemClock::new()),
            renderer: Box::new(NullRenderer),
            listener: None,
            frame_timer: Timer::new(),
            fps: FpsCounter::new(),
            frame: 0,
            running: false,
            next_variable: None,
            next_fixed: None,
        })
    }

    /// Builder pattern: Use a different time source
    pub fn with_clock<C: TimeSource + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Builder pattern: Use a render backend
    pub fn with_renderer<R: RenderBackend + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Builder pattern: Use a resource loader
    pub fn with_loader(mut self, loader: ResourceLoader) -> Self {
        self.world.set_loader(loader);
        self
    }

    // Loop control

    /// Start both clocks
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.world.set_now(now);
        self.frame_timer.reset(now);
        self.running = true;
        self.next_variable = Some(now);
        self.next_fixed = Some(now + self.fixed_step());
        log::info!("Engine started");
    }

    /// Stop the variable loop and cancel the fixed timer
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Engine stopped after {} frame(s)", self.frame);
        }
        self.running = false;
        self.next_variable = None;
        self.next_fixed = None;
    }

    /// Whether the clocks are running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Next time the variable clock is due
    pub fn next_variable_tick(&self) -> Option<Duration> {
        self.next_variable
    }

    /// Next time the fixed clock is due
    pub fn next_fixed_tick(&self) -> Option<Duration> {
        self.next_fixed
    }

    /// Run one variable tick now; returns its `dt`
    pub fn variable_tick(&mut self) -> f32 {
        let dt = self.begin_frame();
        self.end_frame();
        dt
    }

    /// Run one fixed tick now: timers, `fixed_update`, one physics step
    pub fn fixed_tick(&mut self) {
        let now = self.clock.now();
        self.world.set_now(now);

        self.world.fire_timers();
        self.world.apply_commands();

        self.world.fixed_update();
        self.world.apply_commands();

        self.world.physics_mut().step(self.config.loop_rates.fixed_timestep());
        self.handle_stop_request();
    }

    /// Fire whichever clocks are due at the current time
    ///
    /// Returns how many ticks ran. Nothing runs while stopped.
    pub fn poll(&mut self, app: &mut dyn Application) -> Result<usize, EngineError> {
        let now = self.clock.now();
        let mut ticks = 0;

        if self.next_fixed.is_some_and(|due| due <= now) {
            self.fixed_tick();
            ticks += 1;
            if self.running {
                self.next_fixed = Some(now + self.fixed_step());
            }
        }

        if self.next_variable.is_some_and(|due| due <= now) {
            let dt = self.begin_frame();
            let result = app.update(self, dt);
            self.end_frame();
            ticks += 1;
            if let Err(e) = result {
                log::error!("Application update failed: {}", e);
                return Err(EngineError::Application(e.to_string()));
            }
            if self.running {
                self.next_variable = Some(now + self.frame_interval());
            }
        }

        Ok(ticks)
    }

    /// Run the main loop until stopped
    ///
    /// Sleeps until the earlier of the two deadlines, so it needs a time
    /// source that advances on its own.
    pub fn run<T: Application>(&mut self, app: &mut T) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        if !self.running {
            self.start();
        }
        log::info!("Starting main loop...");

        let mut outcome = Ok(());
        while self.running {
            if let Err(e) = self.poll(app) {
                outcome = Err(e);
                break;
            }
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            let now = self.clock.now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
        }

        self.stop();
        app.cleanup(self);
        log::info!("Engine shutdown complete");
        outcome
    }

    /// Earlier of the two clock deadlines
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.next_variable, self.next_fixed) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle an application event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::WindowCloseRequested => self.stop(),
            AppEvent::WindowResized { width, height } => {
                if let Some(camera) = self.world.camera_mut() {
                    camera.set_viewport(width, height);
                }
            }
            AppEvent::KeyInput { key, pressed } => self.world.input_mut().handle_key_input(key, pressed),
            AppEvent::MouseButton { button, pressed } => self.world.input_mut().handle_mouse_button(button, pressed),
            AppEvent::MouseMoved { x, y } => self.world.input_mut().handle_mouse_move(x, y),
            AppEvent::MouseMotion { dx, dy } => self.world.input_mut().handle_mouse_motion(dx, dy),
        }
    }

    // Lifecycle

    /// Add a detached entity and start it
    pub fn add_game_object(&mut self, entity: Entity) -> EntityId {
        self.world.add_game_object(entity)
    }

    /// Remove an entity; same as [`Engine::destroy`]
    pub fn remove_game_object(&mut self, id: EntityId) -> bool {
        self.destroy(id)
    }

    /// Destroy an entity; `false` if it was already gone
    pub fn destroy(&mut self, id: EntityId) -> bool {
        self.world.destroy(id)
    }

    /// Attach a component to a live entity and start it
    ///
    /// A failing `start` is logged, not returned.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Result<ComponentId, EngineError> {
        self.world.add_component(id, component)
    }

    /// Detach a component
    ///
    /// `on_destroy` is not called; the component's timers are cancelled.
    pub fn remove_component(&mut self, id: EntityId, component: ComponentId) -> Option<Box<dyn Component>> {
        self.world.remove_component(id, component).ok()
    }

    /// First component of `kind` on an entity
    pub fn get_component(&self, id: EntityId, kind: ComponentKind) -> Option<&dyn Component> {
        self.world.get_component(id, kind)
    }

    /// Mutable first component of `kind` on an entity
    pub fn get_component_mut(&mut self, id: EntityId, kind: ComponentKind) -> Option<&mut dyn Component> {
        self.world.get_component_mut(id, kind)
    }

    /// Copy of an entity transform
    pub fn transform(&self, id: EntityId) -> Option<Transform> {
        self.world.transform(id)
    }

    /// Move an entity, teleporting its body if it has one
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> Result<(), EngineError> {
        if self.world.set_position(id, position) {
            Ok(())
        } else {
            Err(EngineError::StaleEntity)
        }
    }

    /// Rotate an entity, teleporting its body if it has one
    pub fn set_rotation(&mut self, id: EntityId, rotation: Vec3) -> Result<(), EngineError> {
        if self.world.set_rotation(id, rotation) {
            Ok(())
        } else {
            Err(EngineError::StaleEntity)
        }
    }

    // Accessors

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        self.world.physics()
    }

    /// Engine camera
    pub fn camera(&self) -> Option<&Camera> {
        self.world.camera()
    }

    /// Mutable engine camera
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.world.camera_mut()
    }

    /// Set the engine camera
    pub fn set_camera(&mut self, camera: Camera) {
        self.world.set_camera(camera);
    }

    /// Audio listener, created once a camera exists
    pub fn listener(&self) -> Option<&AudioListener> {
        self.listener.as_ref()
    }

    /// HUD text sinks
    pub fn hud(&self) -> &Hud {
        self.world.hud()
    }

    /// Get the input manager
    pub fn input(&self) -> &InputManager {
        self.world.input()
    }

    /// Mutable input manager
    pub fn input_mut(&mut self) -> &mut InputManager {
        self.world.input_mut()
    }

    /// Resource loader
    pub fn loader(&self) -> &ResourceLoader {
        self.world.loader()
    }

    /// Current time of the engine clock
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Variable ticks run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Most recent FPS measurement
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    // Internals

    fn fixed_step(&self) -> Duration {
        Duration::try_from_secs_f32(self.config.loop_rates.fixed_timestep()).unwrap_or(Duration::from_secs(1))
    }

    fn frame_interval(&self) -> Duration {
        let fps = self.config.loop_rates.target_fps;
        if fps > 0.0 {
            Duration::try_from_secs_f32(1.0 / fps).unwrap_or(Duration::from_secs(1))
        } else {
            Duration::ZERO
        }
    }

    fn begin_frame(&mut self) -> f32 {
        let now = self.clock.now();
        self.world.set_now(now);
        let dt = self.frame_timer.tick(now);

        self.world.fire_timers();
        self.world.apply_commands();

        self.attach_listener();

        self.world.update(dt);
        self.world.apply_commands();

        self.submit_frame();
        self.handle_stop_request();
        dt
    }

    fn end_frame(&mut self) {
        if let Some(fps) = self.fps.frame(self.clock.now()) {
            self.world.hud_mut().set_text(Hud::FPS, format!("FPS: {fps:.0}"));
        }
        self.world.input_mut().end_frame();
    }

    fn attach_listener(&mut self) {
        let Some(camera) = self.world.camera() else {
            return;
        };
        match &mut self.listener {
            Some(listener) => listener.attach(camera),
            None => {
                log::debug!("Audio listener attached to camera");
                self.listener = Some(AudioListener::at_camera(camera));
            }
        }
    }

    fn submit_frame(&mut self) {
        let (width, height) = self.renderer.viewport();
        if let Some(camera) = self.world.camera_mut() {
            camera.set_viewport(width, height);
        }

        self.frame += 1;
        let snapshot = self.world.build_snapshot(self.frame);
        if let Err(e) = self.renderer.submit(&snapshot) {
            log::warn!("Frame {} not submitted: {}", self.frame, e);
        }
    }

    fn handle_stop_request(&mut self) {
        if self.world.take_stop_request() {
            self.stop();
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world)
            .field("frame", &self.frame)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The entity id no longer refers to a live entity
    #[error("Stale entity id")]
    StaleEntity,

    /// The component id no longer refers to an attached component
    #[error("Stale component id")]
    StaleComponent,

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}
