//! Rigid bodies owned by the physics world

use crate::foundation::math::{Quat, Vec3};
use crate::physics::collision::{BodyShape, WorldSpaceShape};
use crate::physics::collision_layers::CollisionLayers;

slotmap::new_key_type! {
    /// Handle to a body inside a [`PhysicsWorld`](super::PhysicsWorld)
    pub struct BodyHandle;
}

/// Surface properties used when two bodies touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsMaterial {
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Bounciness, 0 = no bounce
    pub restitution: f32,
}

impl PhysicsMaterial {
    /// Create a material
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }

    /// Friction used for a contact between two materials
    pub fn combined_friction(&self, other: &PhysicsMaterial) -> f32 {
        (self.friction * other.friction).max(0.0).sqrt()
    }

    /// Restitution used for a contact between two materials
    pub fn combined_restitution(&self, other: &PhysicsMaterial) -> f32 {
        self.restitution.max(other.restitution)
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

/// Description of a body that has not been created yet
///
/// Entities carry one of these until they are added to the engine, at which
/// point the body is created at the entity's current pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Collision shape
    pub shape: BodyShape,
    /// Mass in kilograms, 0 = static
    pub mass: f32,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Layers this body belongs to
    pub group: u32,
    /// Layers this body interacts with
    pub mask: u32,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// Per-axis multiplier on angular motion, zero locks rotation
    pub angular_factor: Vec3,
}

impl BodyDesc {
    /// Dynamic body with the default material on the default layer
    pub fn new(shape: BodyShape, mass: f32) -> Self {
        Self {
            shape,
            mass,
            material: PhysicsMaterial::default(),
            group: CollisionLayers::DEFAULT,
            mask: CollisionLayers::ALL,
            linear_damping: 0.01,
            angular_damping: 0.01,
            angular_factor: Vec3::repeat(1.0),
        }
    }

    /// Static body (mass 0)
    pub fn fixed(shape: BodyShape) -> Self {
        Self::new(shape, 0.0)
    }

    /// Set the surface material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set collision group and mask
    pub fn with_collision(mut self, group: u32, mask: u32) -> Self {
        self.group = group;
        self.mask = mask;
        self
    }

    /// Set linear damping
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set the angular factor
    pub fn with_angular_factor(mut self, factor: Vec3) -> Self {
        self.angular_factor = factor;
        self
    }
}

/// A simulated rigid body
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// World position of the center of mass
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
    /// Linear velocity in m/s
    pub linear_velocity: Vec3,
    /// Angular velocity in rad/s
    pub angular_velocity: Vec3,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Layers this body belongs to
    pub group: u32,
    /// Layers this body interacts with
    pub mask: u32,
    /// Fraction of linear velocity lost per second
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// Per-axis multiplier on angular motion
    pub angular_factor: Vec3,
    shape: BodyShape,
    mass: f32,
    inverse_mass: f32,
    inverse_inertia: Vec3,
    force: Vec3,
    torque: Vec3,
}

impl RigidBody {
    /// Create a body from its description at the given pose
    pub fn from_desc(desc: &BodyDesc, position: Vec3, orientation: Quat) -> Self {
        let mass = desc.mass.max(0.0);
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Self {
            position,
            orientation,
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            material: desc.material,
            group: desc.group,
            mask: desc.mask,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            angular_factor: desc.angular_factor,
            shape: desc.shape,
            mass,
            inverse_mass,
            inverse_inertia: desc.shape.inverse_inertia(mass),
            force: Vec3::zeros(),
            torque: Vec3::zeros(),
        }
    }

    /// Body shape in local space
    pub fn shape(&self) -> &BodyShape {
        &self.shape
    }

    /// Body mass, 0 for static bodies
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass, 0 for static bodies
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Static bodies never move under simulation
    pub fn is_static(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Force accumulated for the next step
    pub fn force(&self) -> Vec3 {
        self.force
    }

    /// Torque accumulated for the next step
    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    /// Accumulate a force through the center of mass
    pub fn apply_force(&mut self, force: Vec3) {
        if !self.is_static() {
            self.force += force;
        }
    }

    /// Accumulate a force applied at a world-space point
    pub fn apply_force_at(&mut self, force: Vec3, point: Vec3) {
        if !self.is_static() {
            self.force += force;
            self.torque += (point - self.position).cross(&force);
        }
    }

    /// Accumulate a torque
    pub fn apply_torque(&mut self, torque: Vec3) {
        if !self.is_static() {
            self.torque += torque;
        }
    }

    /// Instantly change linear velocity by `impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// Drop accumulated force and torque
    pub fn clear_forces(&mut self) {
        self.force = Vec3::zeros();
        self.torque = Vec3::zeros();
    }

    /// Overwrite the pose and reset all motion
    pub fn teleport(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
        self.linear_velocity = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
        self.clear_forces();
    }

    /// Shape placed at the current pose
    pub fn world_shape(&self) -> WorldSpaceShape {
        self.shape.to_world_space(self.position, self.orientation)
    }

    /// Integrate one step (semi-implicit Euler)
    pub(crate) fn integrate(&mut self, gravity: Vec3, dt: f32) {
        if self.is_static() {
            self.clear_forces();
            return;
        }

        let acceleration = gravity + self.force * self.inverse_mass;
        self.linear_velocity += acceleration * dt;
        self.linear_velocity *= (1.0 - self.linear_damping).max(0.0).powf(dt);

        // Inertia is diagonal in the local frame
        let local_torque = self.orientation.inverse() * self.torque;
        let local_alpha = local_torque.component_mul(&self.inverse_inertia);
        let alpha = (self.orientation * local_alpha).component_mul(&self.angular_factor);
        self.angular_velocity += alpha * dt;
        self.angular_velocity = self.angular_velocity.component_mul(&self.angular_factor);
        self.angular_velocity *= (1.0 - self.angular_damping).max(0.0).powf(dt);

        self.position += self.linear_velocity * dt;

        let angle = self.angular_velocity.magnitude() * dt;
        if angle > f32::EPSILON {
            let axis = nalgebra::Unit::new_normalize(self.angular_velocity);
            let delta = Quat::from_axis_angle(&axis, angle);
            self.orientation = delta * self.orientation;
        }

        self.clear_forces();
    }
}
