//! Physics world: body storage and the fixed-step solver
//!
//! A small sequential-impulse solver for boxes and spheres. Each step
//! integrates every dynamic body, gathers contacts between pairs whose layers
//! accept each other, resolves contact velocities over a fixed number of
//! iterations and finally pushes overlapping bodies apart.

use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::math::{Quat, Vec3};
use crate::physics::body::{BodyDesc, BodyHandle, RigidBody};
use crate::physics::collision::Contact;
use crate::physics::collision_layers::CollisionLayers;

/// Penetration allowed before positional correction kicks in
const PENETRATION_SLOP: f32 = 0.005;

/// Fraction of the excess penetration removed per step
const CORRECTION_PERCENT: f32 = 0.8;

/// Approach speed below which contacts do not bounce
const RESTITUTION_THRESHOLD: f32 = 1.0;

struct ContactConstraint {
    body_a: BodyHandle,
    body_b: BodyHandle,
    contact: Contact,
    friction: f32,
    target_speed: f32,
    normal_impulse: f32,
}

/// Owner of every rigid body
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, RigidBody>,
    gravity: Vec3,
    solver_iterations: u32,
}

impl PhysicsWorld {
    /// Create an empty world from configuration
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            gravity: Vec3::from(config.gravity),
            solver_iterations: config.solver_iterations.max(1),
        }
    }

    /// Create a body at the given pose
    pub fn add_body(&mut self, desc: &BodyDesc, position: Vec3, orientation: Quat) -> BodyHandle {
        let handle = self.bodies.insert(RigidBody::from_desc(desc, position, orientation));
        log::debug!("Added body {:?} (mass {}) at {:?}", handle, desc.mass, position);
        handle
    }

    /// Remove a body, returning it if the handle was live
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let removed = self.bodies.remove(handle);
        if removed.is_some() {
            log::debug!("Removed body {:?}", handle);
        }
        removed
    }

    /// Check whether a handle is live
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Get a body
    pub fn get(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Get a body mutably
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Iterate over all bodies
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the world holds no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// World gravity
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Change world gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Accumulate a force on a body for the next step
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.apply_force(force);
                true
            }
            None => false,
        }
    }

    /// Overwrite a body's pose and reset its motion
    pub fn teleport(&mut self, handle: BodyHandle, position: Vec3, orientation: Quat) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.teleport(position, orientation);
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by one step of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            body.integrate(gravity, dt);
        }

        let mut constraints = self.gather_contacts();
        if constraints.is_empty() {
            return;
        }

        for _ in 0..self.solver_iterations {
            for constraint in constraints.iter_mut() {
                self.solve_velocity(constraint);
            }
        }

        for constraint in &constraints {
            self.correct_position(constraint);
        }
    }

    fn gather_contacts(&self) -> Vec<ContactConstraint> {
        let handles: Vec<BodyHandle> = self.bodies.keys().collect();
        let mut constraints = Vec::new();

        for (i, &handle_a) in handles.iter().enumerate() {
            for &handle_b in &handles[i + 1..] {
                let (Some(a), Some(b)) = (self.bodies.get(handle_a), self.bodies.get(handle_b)) else {
                    continue;
                };
                if a.is_static() && b.is_static() {
                    continue;
                }
                if !CollisionLayers::should_collide(a.group, a.mask, b.group, b.mask) {
                    continue;
                }
                let Some(contact) = a.world_shape().contact(&b.world_shape()) else {
                    continue;
                };

                let approach = (b.linear_velocity - a.linear_velocity).dot(&contact.normal);
                let target_speed = if -approach > RESTITUTION_THRESHOLD {
                    -approach * a.material.combined_restitution(&b.material)
                } else {
                    0.0
                };

                constraints.push(ContactConstraint {
                    body_a: handle_a,
                    body_b: handle_b,
                    contact,
                    friction: a.material.combined_friction(&b.material),
                    target_speed,
                    normal_impulse: 0.0,
                });
            }
        }

        constraints
    }

    fn solve_velocity(&mut self, constraint: &mut ContactConstraint) {
        let (Some(a), Some(b)) = (self.bodies.get(constraint.body_a), self.bodies.get(constraint.body_b)) else {
            return;
        };
        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 {
            return;
        }

        let normal = constraint.contact.normal;
        let mut velocity_a = a.linear_velocity;
        let mut velocity_b = b.linear_velocity;

        // Normal impulse, accumulated and clamped to push only
        let relative = velocity_b - velocity_a;
        let normal_speed = relative.dot(&normal);
        let delta = (constraint.target_speed - normal_speed) / inv_sum;
        let accumulated = (constraint.normal_impulse + delta).max(0.0);
        let applied = accumulated - constraint.normal_impulse;
        constraint.normal_impulse = accumulated;

        velocity_a -= normal * (applied * inv_a);
        velocity_b += normal * (applied * inv_b);

        // Coulomb friction against the current normal impulse
        let relative = velocity_b - velocity_a;
        let tangential = relative - normal * relative.dot(&normal);
        let tangential_speed = tangential.magnitude();
        if tangential_speed > 1e-6 {
            let tangent = tangential / tangential_speed;
            let max_friction = constraint.friction * constraint.normal_impulse;
            let friction_impulse = (tangential_speed / inv_sum).min(max_friction);
            velocity_a += tangent * (friction_impulse * inv_a);
            velocity_b -= tangent * (friction_impulse * inv_b);
        }

        if let Some(a) = self.bodies.get_mut(constraint.body_a) {
            a.linear_velocity = velocity_a;
        }
        if let Some(b) = self.bodies.get_mut(constraint.body_b) {
            b.linear_velocity = velocity_b;
        }
    }

    fn correct_position(&mut self, constraint: &ContactConstraint) {
        let (Some(a), Some(b)) = (self.bodies.get(constraint.body_a), self.bodies.get(constraint.body_b)) else {
            return;
        };
        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 {
            return;
        }

        let magnitude = (constraint.contact.depth - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT / inv_sum;
        if magnitude <= 0.0 {
            return;
        }
        let correction = constraint.contact.normal * magnitude;

        if let Some(a) = self.bodies.get_mut(constraint.body_a) {
            a.position -= correction * inv_a;
        }
        if let Some(b) = self.bodies.get_mut(constraint.body_b) {
            b.position += correction * inv_b;
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::BodyShape;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn ground(world: &mut PhysicsWorld) -> BodyHandle {
        // 100 x 1 x 100 slab with its top face at y = -1
        world.add_body(
            &BodyDesc::fixed(BodyShape::cuboid(50.0, 0.5, 50.0)),
            Vec3::new(0.0, -1.5, 0.0),
            Quat::identity(),
        )
    }

    #[test]
    fn test_static_box_does_not_move() {
        let mut world = PhysicsWorld::default();
        let handle = world.add_body(
            &BodyDesc::fixed(BodyShape::cuboid(0.5, 0.5, 0.5)),
            Vec3::new(0.0, -2.0, 0.0),
            Quat::identity(),
        );

        for _ in 0..100 {
            world.step(DT);
        }

        let body = world.get(handle).unwrap();
        assert_eq!(body.position, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(body.orientation, Quat::identity());
    }

    #[test]
    fn test_box_settles_on_ground() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let cube = world.add_body(
            &BodyDesc::new(BodyShape::cuboid(0.5, 0.5, 0.5), 1.0),
            Vec3::new(0.0, 5.0, 0.0),
            Quat::identity(),
        );

        for _ in 0..300 {
            world.step(DT);
        }
        let settled = world.get(cube).unwrap().position;
        assert_relative_eq!(settled.y, -0.5, epsilon = 0.02);
        assert_relative_eq!(settled.x, 0.0, epsilon = 1e-4);

        for _ in 0..120 {
            world.step(DT);
        }
        let later = world.get(cube).unwrap().position;
        assert_relative_eq!(later.y, settled.y, epsilon = 1e-3);
    }

    #[test]
    fn test_sphere_rests_on_ground() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let ball = world.add_body(
            &BodyDesc::new(BodyShape::sphere(0.5), 1.0),
            Vec3::new(0.0, 2.0, 0.0),
            Quat::identity(),
        );

        for _ in 0..300 {
            world.step(DT);
        }
        assert_relative_eq!(world.get(ball).unwrap().position.y, -0.5, epsilon = 0.02);
    }

    #[test]
    fn test_non_matching_layers_pass_through() {
        let mut world = PhysicsWorld::default();
        world.add_body(
            &BodyDesc::fixed(BodyShape::cuboid(50.0, 0.5, 50.0))
                .with_collision(CollisionLayers::ENVIRONMENT, CollisionLayers::PLAYER),
            Vec3::new(0.0, -1.5, 0.0),
            Quat::identity(),
        );
        let debris = world.add_body(
            &BodyDesc::new(BodyShape::sphere(0.25), 1.0)
                .with_collision(CollisionLayers::DEBRIS, CollisionLayers::ALL),
            Vec3::new(0.0, 0.0, 0.0),
            Quat::identity(),
        );

        for _ in 0..120 {
            world.step(DT);
        }
        assert!(world.get(debris).unwrap().position.y < -3.0);
    }

    #[test]
    fn test_teleport_and_remove() {
        let mut world = PhysicsWorld::default();
        let handle = world.add_body(&BodyDesc::new(BodyShape::sphere(1.0), 1.0), Vec3::zeros(), Quat::identity());
        world.step(DT);
        assert!(world.get(handle).unwrap().linear_velocity.y < 0.0);

        assert!(world.teleport(handle, Vec3::new(1.0, 2.0, 3.0), Quat::identity()));
        let body = world.get(handle).unwrap();
        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.linear_velocity, Vec3::zeros());

        assert!(world.remove_body(handle).is_some());
        assert!(!world.contains(handle));
        assert!(!world.teleport(handle, Vec3::zeros(), Quat::identity()));
        assert!(world.remove_body(handle).is_none());
    }

    #[test]
    fn test_force_pushes_body() {
        let mut world = PhysicsWorld::default();
        world.set_gravity(Vec3::zeros());
        let handle = world.add_body(&BodyDesc::new(BodyShape::sphere(1.0), 2.0), Vec3::zeros(), Quat::identity());

        assert!(world.apply_force(handle, Vec3::new(120.0, 0.0, 0.0)));
        world.step(DT);
        assert!(world.get(handle).unwrap().linear_velocity.x > 0.9);
    }
}
