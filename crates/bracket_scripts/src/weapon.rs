//! Hitscan weapon held in front of the camera
//!
//! The weapon entity is posed relative to the engine camera every fixed tick,
//! with bobbing driven by the player's body, recoil after each shot and a dip
//! while reloading. Shots are rays from the camera; a hit spawns a
//! [`HitMarker`] and pushes the body that was hit.

use std::time::Duration;

use bracket_engine::foundation::math::constants::{DEG_TO_RAD, PI};
use bracket_engine::foundation::math::quaternion_from_euler;
use bracket_engine::foundation::math::utils::lerp;
use bracket_engine::prelude::*;
use nalgebra::UnitQuaternion;

use crate::hit_marker::HitMarker;
use crate::player_controls::PlayerControls;

const FIRE_READY: TimerTag = TimerTag(1);
const TRIGGER_READY: TimerTag = TimerTag(2);
const RELOADED: TimerTag = TimerTag(3);

/// HUD sink showing the ammo readout
pub const GUNINFO_SINK: &str = "guninfo";

/// Tuning of a weapon
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponConfig {
    /// Shown in the ammo readout
    pub name: String,
    /// Amplitude of the walk bob
    pub bob_strength: f32,
    /// Sign of the recoil kick around the local X axis
    pub recoil_direction: f32,
    /// Kick per shot, in degrees
    pub recoil_degrees: f32,
    /// How quickly the gun follows the camera rotation
    pub rot_smoothing: f32,
    /// Ray length
    pub distance: f32,
    /// Force applied to the body that was hit
    pub force: f32,
    /// Minimum time between shots
    pub fire_rate: Duration,
    /// Length of a reload
    pub reload_time: Duration,
    /// Magazine size
    pub max_ammo: u32,
    /// One shot per click instead of automatic fire
    pub single_shot: bool,
    /// Damage per hit
    pub damage: f32,
    /// Position relative to the camera
    pub offset: Vec3,
    /// Rotation (Euler XYZ, radians) relative to the camera
    pub rot_offset: Vec3,
    /// Mesh spawned at hit points, if any
    pub hit_marker_mesh: Option<String>,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            name: "Rifle".to_string(),
            bob_strength: 0.05,
            recoil_direction: -1.0,
            recoil_degrees: 10.0,
            rot_smoothing: 15.0,
            distance: 500.0,
            force: 50_000.0,
            fire_rate: Duration::from_millis(100),
            reload_time: Duration::from_millis(2500),
            max_ammo: 30,
            single_shot: false,
            damage: 30.0,
            offset: Vec3::new(0.15, -0.3, -0.6),
            rot_offset: Vec3::new(0.0, PI, 0.0),
            hit_marker_mesh: Some("Models/Primitive/sphere.obj".to_string()),
        }
    }
}

/// Hitscan weapon component
#[derive(Debug, Clone)]
pub struct Weapon {
    config: WeaponConfig,
    ammo: u32,
    shooting: bool,
    fire: Cooldown,
    trigger: Cooldown,
    reload: Cooldown,
    current_recoil: f32,
    reload_offset: f32,
    bob_phase: f32,
    cam_rot: Option<Quat>,
    player: Option<EntityId>,
}

impl Weapon {
    /// Weapon with a full magazine
    pub fn new(config: WeaponConfig) -> Self {
        let fire = Cooldown::new(config.fire_rate, FIRE_READY);
        let trigger = Cooldown::new(config.fire_rate, TRIGGER_READY);
        let reload = Cooldown::new(config.reload_time, RELOADED);
        Self {
            ammo: config.max_ammo,
            config,
            shooting: false,
            fire,
            trigger,
            reload,
            current_recoil: 0.0,
            reload_offset: 0.0,
            bob_phase: 0.0,
            cam_rot: None,
            player: None,
        }
    }

    /// Builder pattern: Start with a partly filled magazine
    pub fn with_ammo(mut self, ammo: u32) -> Self {
        self.ammo = ammo.min(self.config.max_ammo);
        self
    }

    /// Builder pattern: Bob with this player's movement
    pub fn with_player(mut self, player: EntityId) -> Self {
        self.player = Some(player);
        self
    }

    /// Weapon tuning
    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    /// Rounds left in the magazine
    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Whether the fire-rate cooldown is running
    pub fn is_busy(&self) -> bool {
        !self.fire.is_ready()
    }

    /// Whether a reload is in progress
    pub fn is_reloading(&self) -> bool {
        !self.reload.is_ready()
    }

    /// Whether the trigger is held (or a single shot is pending)
    pub fn is_shooting(&self) -> bool {
        self.shooting
    }

    /// Fire one shot from the camera
    ///
    /// Rejected while the fire-rate cooldown runs, while reloading or with an
    /// empty magazine.
    pub fn fire(&mut self, ctx: &mut Context<'_>) -> bool {
        if self.is_busy() || self.ammo == 0 || self.is_reloading() {
            return false;
        }
        self.ammo -= 1;
        self.fire.trigger(ctx);
        self.current_recoil += self.config.recoil_degrees * DEG_TO_RAD;

        let Some((origin, direction)) = ctx.camera().map(|camera| (camera.position, camera.forward())) else {
            return true;
        };
        let target = origin + direction * self.config.distance;
        let hit = ctx
            .query()
            .raycast_closest(origin, target, RayFilter::excluding(CollisionLayers::PLAYER));
        if !hit.has_hit {
            return true;
        }

        log::debug!("{} hit at {:?} ({:.1} m)", self.config.name, hit.point, hit.distance);
        if let Some(mesh) = &self.config.hit_marker_mesh {
            ctx.spawn(
                Entity::named("hit marker")
                    .with_position(hit.point)
                    .with_scale(Vec3::repeat(0.25))
                    .with_component(
                        MeshComponent::from_path(mesh.clone())
                            .with_material(Material::unlit().with_color(1.0, 0.0, 0.0))
                            .with_shadows(false, false),
                    )
                    .with_component(HitMarker::new()),
            );
        }
        if let Some(body) = hit.body {
            ctx.apply_force(body, direction * self.config.force);
        }
        true
    }

    fn start_reload(&mut self, ctx: &mut Context<'_>) {
        if self.ammo < self.config.max_ammo && self.reload.trigger(ctx) {
            log::debug!("{} reloading", self.config.name);
        }
    }

    fn player_motion(&self, ctx: &Context<'_>) -> (f32, bool) {
        let Some(player) = self.player else {
            return (0.0, false);
        };
        let speed = ctx.entity_body(player).map_or(0.0, |body| {
            Vec3::new(body.linear_velocity.x, 0.0, body.linear_velocity.z).norm()
        });
        let grounded = ctx
            .get_component(player, ComponentKind::PlayerControls)
            .and_then(|component| component.downcast_ref::<PlayerControls>())
            .is_some_and(PlayerControls::grounded);
        (speed, grounded)
    }

    fn follow_camera(&mut self, ctx: &mut Context<'_>) {
        let Some((camera_position, camera_rotation)) = ctx.camera().map(|camera| (camera.position, camera.orientation))
        else {
            return;
        };
        let step = ctx.fixed_timestep();

        let cam_rot = match self.cam_rot {
            Some(previous) => previous
                .try_slerp(&camera_rotation, (self.config.rot_smoothing * step).min(1.0), 1.0e-6)
                .unwrap_or(camera_rotation),
            None => camera_rotation,
        };
        self.cam_rot = Some(cam_rot);

        let (speed, grounded) = self.player_motion(ctx);
        let bob = if grounded && speed > 0.01 {
            self.bob_phase += speed * step;
            Vec3::new(
                self.bob_phase.sin() * self.config.bob_strength,
                (self.bob_phase * 2.0).sin().abs() * self.config.bob_strength,
                0.0,
            )
        } else {
            self.bob_phase = 0.0;
            Vec3::zeros()
        };

        let dip = Vec3::new(0.0, -0.3 * self.reload_offset, 0.0);
        let position = camera_position + cam_rot * (self.config.offset + bob + dip);

        let kick = UnitQuaternion::from_axis_angle(
            &Vec3::x_axis(),
            -self.config.recoil_direction * self.current_recoil - self.reload_offset * PI / 4.0,
        );
        let offset = quaternion_from_euler(self.config.rot_offset);

        ctx.set_position(position);
        ctx.set_orientation(&(cam_rot * kick * offset));
    }
}

impl Component for Weapon {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Weapon
    }

    fn update(&mut self, ctx: &mut Context<'_>, _dt: f32) {
        let input = ctx.input();
        let pressed = input.was_button_pressed(MouseButton::Left);
        let released = input.was_button_released(MouseButton::Left);
        let reload = input.was_key_pressed(KeyCode::R);

        if pressed {
            if self.config.single_shot {
                if self.trigger.trigger(ctx) {
                    self.shooting = true;
                }
            } else {
                self.shooting = true;
            }
        }
        if released && !self.config.single_shot {
            self.shooting = false;
        }
        if reload {
            self.start_reload(ctx);
        }
    }

    fn fixed_update(&mut self, ctx: &mut Context<'_>) {
        let readout = format!("{}: {}/{}", self.config.name, self.ammo, self.config.max_ammo);
        ctx.hud_mut().set_text(GUNINFO_SINK, readout);

        if self.shooting && self.fire(ctx) && self.config.single_shot {
            self.shooting = false;
        }

        let step = ctx.fixed_timestep();
        let reloading = self.is_reloading();
        if reloading {
            self.ammo = self.config.max_ammo;
        }
        let target = if reloading { 1.0 } else { 0.0 };
        self.reload_offset = lerp(self.reload_offset, target, (10.0 * step).min(1.0));
        self.current_recoil = lerp(self.current_recoil, 0.0, (self.config.rot_smoothing * step).min(1.0));

        self.follow_camera(ctx);
    }

    fn on_timer(&mut self, _ctx: &mut Context<'_>, tag: TimerTag) {
        if self.reload.handle_timer(tag) {
            log::debug!("{} reloaded", self.config.name);
        }
        self.fire.handle_timer(tag);
        self.trigger.handle_timer(tag);
    }

    fn on_destroy(&mut self, ctx: &mut Context<'_>) {
        ctx.hud_mut().clear(GUNINFO_SINK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quick_rifle() -> WeaponConfig {
        WeaponConfig {
            name: "Test".to_string(),
            fire_rate: Duration::from_millis(100),
            reload_time: Duration::from_millis(300),
            max_ammo: 5,
            hit_marker_mesh: None,
            ..WeaponConfig::default()
        }
    }

    fn armed(weapon: Weapon) -> (Engine, ManualClock, EntityId) {
        let clock = ManualClock::new();
        let mut engine = Engine::new(EngineConfig::default()).unwrap().with_clock(clock.clone());
        engine.set_camera(Camera::default());
        let gun = engine.add_game_object(Entity::named("gun").with_component(weapon));
        engine.start();
        (engine, clock, gun)
    }

    fn weapon(engine: &Engine, gun: EntityId) -> &Weapon {
        engine
            .get_component(gun, ComponentKind::Weapon)
            .and_then(|c| c.downcast_ref::<Weapon>())
            .unwrap()
    }

    fn pull_trigger(engine: &mut Engine) {
        engine.input_mut().handle_mouse_button(MouseButton::Left, true);
        engine.variable_tick();
    }

    #[test]
    fn test_rest_pose_uses_transform_euler_order() {
        let config = WeaponConfig {
            rot_offset: Vec3::new(0.3, 0.2, -0.4),
            ..quick_rifle()
        };
        let offset = config.offset;
        let (mut engine, _clock, gun) = armed(Weapon::new(config));

        engine.fixed_tick();
        let transform = engine.transform(gun).unwrap();
        assert_relative_eq!(transform.rotation, Vec3::new(0.3, 0.2, -0.4), epsilon = 1e-5);
        assert_relative_eq!(transform.position, offset, epsilon = 1e-5);
    }

    #[test]
    fn test_fire_rate_cooldown_with_last_round() {
        let (mut engine, clock, gun) = armed(Weapon::new(quick_rifle()).with_ammo(1));
        pull_trigger(&mut engine);

        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 0);
        assert!(weapon(&engine, gun).is_busy());

        clock.advance_millis(50);
        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 0);
        assert!(weapon(&engine, gun).is_busy());

        clock.advance_millis(50);
        engine.fixed_tick();
        assert!(!weapon(&engine, gun).is_busy());
    }

    #[test]
    fn test_second_shot_waits_for_fire_rate() {
        let (mut engine, clock, gun) = armed(Weapon::new(quick_rifle()).with_ammo(2));
        pull_trigger(&mut engine);

        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 1);

        clock.advance_millis(60);
        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 1);

        clock.advance_millis(40);
        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 0);
    }

    #[test]
    fn test_single_shot_fires_once_per_click() {
        let config = WeaponConfig {
            single_shot: true,
            ..quick_rifle()
        };
        let (mut engine, clock, gun) = armed(Weapon::new(config));
        pull_trigger(&mut engine);

        for _ in 0..5 {
            engine.fixed_tick();
            clock.advance_millis(150);
        }
        assert_eq!(weapon(&engine, gun).ammo(), 4);
    }

    #[test]
    fn test_reload_refills_every_tick_until_done() {
        let (mut engine, clock, gun) = armed(Weapon::new(quick_rifle()).with_ammo(1));
        engine.input_mut().handle_key_input(KeyCode::R, true);
        engine.variable_tick();
        assert!(weapon(&engine, gun).is_reloading());

        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 5);
        assert_eq!(engine.hud().text(GUNINFO_SINK), Some("Test: 1/5"));

        clock.advance_millis(300);
        engine.fixed_tick();
        assert!(!weapon(&engine, gun).is_reloading());
        assert_eq!(engine.hud().text(GUNINFO_SINK), Some("Test: 5/5"));
    }

    #[test]
    fn test_no_shots_while_reloading() {
        let (mut engine, _clock, gun) = armed(Weapon::new(quick_rifle()).with_ammo(3));
        engine.input_mut().handle_key_input(KeyCode::R, true);
        pull_trigger(&mut engine);

        engine.fixed_tick();
        let weapon = weapon(&engine, gun);
        assert!(weapon.is_reloading());
        assert!(!weapon.is_busy());
    }

    #[test]
    fn test_hit_pushes_body_and_spawns_marker() {
        let config = WeaponConfig {
            hit_marker_mesh: Some("sphere.obj".to_string()),
            ..quick_rifle()
        };
        let (mut engine, _clock, gun) = armed(Weapon::new(config));
        let target = engine.add_game_object(
            Entity::named("target")
                .with_position(Vec3::new(0.0, 0.0, -10.0))
                .with_body(BodyDesc::new(BodyShape::cuboid(1.0, 1.0, 1.0), 1.0)),
        );
        let before = engine.world().entity_count();
        pull_trigger(&mut engine);

        engine.fixed_tick();
        assert_eq!(weapon(&engine, gun).ammo(), 4);
        assert_eq!(engine.world().entity_count(), before + 1);

        let handle = engine.world().body_handle(target).unwrap();
        assert!(engine.physics().get(handle).unwrap().linear_velocity.z < 0.0);
    }

    #[test]
    fn test_destroy_clears_readout() {
        let (mut engine, _clock, gun) = armed(Weapon::new(quick_rifle()));
        engine.fixed_tick();
        assert!(engine.hud().text(GUNINFO_SINK).is_some());

        engine.remove_game_object(gun);
        assert!(engine.hud().text(GUNINFO_SINK).is_none());
    }
}
