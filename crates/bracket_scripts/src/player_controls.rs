//! Rigid-body player controls
//!
//! Walks a physics body with forces, keeps the camera at the body position,
//! probes for ground with a downward ray and jumps on Space.

use std::time::Duration;

use bracket_engine::prelude::*;

use crate::look::MouseLook;

const JUMP_READY: TimerTag = TimerTag(1);

/// First-person controls for an entity with a body
#[derive(Debug, Clone)]
pub struct PlayerControls {
    /// Mouse look state
    pub look: MouseLook,
    /// Walking force scale
    pub move_speed: f32,
    /// Upward force applied on jump
    pub jump_force: f32,
    /// Fraction of horizontal velocity kept each update
    pub damping: f32,
    /// Length of the downward ground probe
    pub ground_probe: f32,
    jump_cooldown: Cooldown,
    grounded: bool,
}

impl PlayerControls {
    /// Default tuning
    pub fn new() -> Self {
        Self {
            look: MouseLook::new(0.5),
            move_speed: 20.0,
            jump_force: 400.0,
            damping: 0.9,
            ground_probe: 2.0,
            jump_cooldown: Cooldown::new(Duration::from_millis(500), JUMP_READY),
            grounded: false,
        }
    }

    /// Whether the ground probe hit something on the last update
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Whether the jump cooldown has elapsed
    pub fn can_jump(&self) -> bool {
        self.jump_cooldown.is_ready()
    }

    fn walk_force(&self, input: &InputManager, forward: Vec3, dt: f32) -> Vec3 {
        let push = forward * self.move_speed * 100.0 * dt;
        let mut force = Vec3::zeros();
        if input.is_key_down(KeyCode::W) {
            force += Vec3::new(push.x, 0.0, push.z);
        }
        if input.is_key_down(KeyCode::S) {
            force += Vec3::new(-push.x, 0.0, -push.z);
        }
        if input.is_key_down(KeyCode::A) {
            force += Vec3::new(push.z, 0.0, -push.x);
        }
        if input.is_key_down(KeyCode::D) {
            force += Vec3::new(-push.z, 0.0, push.x);
        }
        force
    }

    fn probe_ground(&self, ctx: &Context<'_>, origin: Vec3, group: u32) -> bool {
        let target = origin - Vec3::new(0.0, self.ground_probe, 0.0);
        ctx.query()
            .raycast_all(origin, target, RayFilter::excluding(group), |_| {})
            > 0
    }
}

impl Default for PlayerControls {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PlayerControls {
    fn kind(&self) -> ComponentKind {
        ComponentKind::PlayerControls
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let body = ctx.body_mut().ok_or(ComponentError::MissingBody)?;
        body.angular_factor = Vec3::zeros();
        body.angular_velocity = Vec3::zeros();
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, dt: f32) {
        let Some(handle) = ctx.body_handle() else {
            return;
        };

        if let Some(orientation) = self.look.apply(ctx.input(), dt) {
            if let Some(camera) = ctx.camera_mut() {
                camera.set_orientation(orientation);
            }
        }
        let forward = ctx
            .camera()
            .map_or_else(|| self.look.orientation() * Vec3::new(0.0, 0.0, -1.0), Camera::forward);

        let walk = self.walk_force(ctx.input(), forward, dt);
        if walk != Vec3::zeros() {
            ctx.apply_force(handle, walk);
        }

        if ctx.input().was_key_pressed(KeyCode::Space) && self.grounded && self.jump_cooldown.trigger(ctx) {
            ctx.apply_force(handle, Vec3::new(0.0, self.jump_force, 0.0));
        }

        let Some((position, group)) = ctx.body().map(|body| (body.position, body.group)) else {
            return;
        };
        self.grounded = self.probe_ground(ctx, position, group);

        if let Some(body) = ctx.body_mut() {
            body.linear_velocity.x *= self.damping;
            body.linear_velocity.z *= self.damping;
        }

        if let Some(camera) = ctx.camera_mut() {
            camera.set_position(position);
        }
    }

    fn on_timer(&mut self, _ctx: &mut Context<'_>, tag: TimerTag) {
        self.jump_cooldown.handle_timer(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (Engine, ManualClock, EntityId) {
        let clock = ManualClock::new();
        let mut engine = Engine::new(EngineConfig::default()).unwrap().with_clock(clock.clone());
        engine.set_camera(Camera::default());
        engine.add_game_object(
            Entity::named("ground")
                .with_position(Vec3::new(0.0, -1.0, 0.0))
                .with_body(
                    BodyDesc::fixed(BodyShape::cuboid(20.0, 0.5, 20.0))
                        .with_collision(CollisionLayers::ENVIRONMENT, CollisionLayers::ALL),
                ),
        );
        let player = engine.add_game_object(
            Entity::named("player")
                .with_position(Vec3::new(0.0, 0.5, 0.0))
                .with_body(
                    BodyDesc::new(BodyShape::sphere(1.0), 1.0)
                        .with_collision(CollisionLayers::PLAYER, CollisionLayers::ALL),
                )
                .with_component(PlayerControls::new()),
        );
        engine.start();
        (engine, clock, player)
    }

    fn controls(engine: &Engine, player: EntityId) -> &PlayerControls {
        engine
            .get_component(player, ComponentKind::PlayerControls)
            .and_then(|c| c.downcast_ref::<PlayerControls>())
            .unwrap()
    }

    #[test]
    fn test_grounded_on_floor_and_camera_follows() {
        let (mut engine, clock, player) = scene();
        for _ in 0..30 {
            clock.advance_millis(16);
            engine.fixed_tick();
            engine.variable_tick();
        }
        assert!(controls(&engine, player).grounded());
        let body_position = engine.transform(player).unwrap().position;
        assert_eq!(engine.camera().unwrap().position, body_position);
    }

    #[test]
    fn test_not_grounded_in_the_air() {
        let (mut engine, _clock, player) = scene();
        engine.set_position(player, Vec3::new(0.0, 50.0, 0.0)).unwrap();
        engine.variable_tick();
        assert!(!controls(&engine, player).grounded());
    }

    #[test]
    fn test_jump_starts_cooldown() {
        let (mut engine, clock, player) = scene();
        for _ in 0..30 {
            clock.advance_millis(16);
            engine.fixed_tick();
            engine.variable_tick();
        }

        engine.input_mut().handle_key_input(KeyCode::Space, true);
        clock.advance_millis(16);
        engine.variable_tick();
        assert!(!controls(&engine, player).can_jump());

        clock.advance_millis(600);
        engine.variable_tick();
        assert!(controls(&engine, player).can_jump());
    }

    #[test]
    fn test_rotation_is_locked() {
        let (engine, _clock, player) = scene();
        let handle = engine.world().body_handle(player).unwrap();
        assert_eq!(engine.physics().get(handle).unwrap().angular_factor, Vec3::zeros());
    }
}
