//! Hook context
//!
//! Every component hook receives a [`Context`]. It identifies the calling
//! entity and component and exposes the engine services a script may use:
//! the entity transform and body, spatial queries, timers, the camera, input,
//! the HUD and the resource loader. Structural changes go through the
//! command queue and take effect once the current pass is over.

use std::time::Duration;

use crate::assets::ResourceLoader;
use crate::ecs::{Command, Component, ComponentId, ComponentKind, Entity, EntityId, TimerId, TimerTag, Transform, World};
use crate::foundation::math::{Quat, Vec3};
use crate::input::InputManager;
use crate::physics::{BodyHandle, RigidBody, SpatialQuery};
use crate::render::Camera;
use crate::ui::Hud;

/// Handle passed to component hooks
pub struct Context<'a> {
    world: &'a mut World,
    entity: EntityId,
    component: ComponentId,
}

impl<'a> Context<'a> {
    pub(crate) fn new(world: &'a mut World, entity: EntityId, component: ComponentId) -> Self {
        Self {
            world,
            entity,
            component,
        }
    }

    /// Entity running the hook
    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// Component running the hook
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Engine time of the current tick
    pub fn now(&self) -> Duration {
        self.world.now
    }

    /// Length of one fixed step in seconds
    pub fn fixed_timestep(&self) -> f32 {
        self.world.fixed_timestep
    }

    // Own entity

    /// Copy of the entity transform
    pub fn transform(&self) -> Transform {
        self.world.transform(self.entity).unwrap_or_default()
    }

    /// Move the entity, teleporting its body if it has one
    pub fn set_position(&mut self, position: Vec3) {
        self.world.set_position(self.entity, position);
    }

    /// Rotate the entity (Euler angles in radians)
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.world.set_rotation(self.entity, rotation);
    }

    /// Rotate the entity from a quaternion
    pub fn set_orientation(&mut self, orientation: &Quat) {
        let mut transform = self.transform();
        transform.set_orientation(orientation);
        self.world.set_rotation(self.entity, transform.rotation);
    }

    /// Scale the entity
    pub fn set_scale(&mut self, scale: Vec3) {
        self.world.set_scale(self.entity, scale);
    }

    /// Body of the entity, if any
    pub fn body_handle(&self) -> Option<BodyHandle> {
        self.world.body_handle(self.entity)
    }

    /// Borrow the entity body
    pub fn body(&self) -> Option<&RigidBody> {
        self.body_handle().and_then(|handle| self.world.physics.get(handle))
    }

    /// Mutably borrow the entity body
    pub fn body_mut(&mut self) -> Option<&mut RigidBody> {
        let handle = self.body_handle()?;
        self.world.physics.get_mut(handle)
    }

    // Other entities

    /// Transform of any live entity
    pub fn entity_transform(&self, entity: EntityId) -> Option<Transform> {
        self.world.transform(entity)
    }

    /// Body of any live entity
    pub fn entity_body(&self, entity: EntityId) -> Option<&RigidBody> {
        self.world.body_handle(entity).and_then(|handle| self.world.physics.get(handle))
    }

    /// First component of `kind` on another entity
    ///
    /// Components of the calling entity are busy while its hooks run and are
    /// not visible here.
    pub fn get_component(&self, entity: EntityId, kind: ComponentKind) -> Option<&dyn Component> {
        self.world.get_component(entity, kind)
    }

    /// Whether an entity is alive
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.world.contains(entity)
    }

    /// Push a body; `false` if the handle is stale
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec3) -> bool {
        self.world.physics.apply_force(body, force)
    }

    /// Ray and shape queries against the physics world
    pub fn query(&self) -> SpatialQuery<'_> {
        SpatialQuery::new(&self.world.physics)
    }

    // Timers

    /// Ask for `on_timer(tag)` on this component after `delay`
    pub fn schedule(&mut self, delay: Duration, tag: TimerTag) -> TimerId {
        let due = self.world.now + delay;
        self.world.timers.schedule(self.entity, self.component, due, tag)
    }

    /// Cancel a timer this component scheduled
    pub fn cancel_timer(&mut self, timer: TimerId) -> bool {
        self.world.timers.cancel_owned(timer, self.component)
    }

    // Structural changes, applied after the current pass

    /// Add a new entity; it goes live once the current pass is over
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.world.insert_detached(entity);
        self.world.commands.push(Command::Spawn(id));
        id
    }

    /// Destroy an entity
    pub fn destroy(&mut self, entity: EntityId) {
        self.world.commands.push(Command::Destroy(entity));
    }

    /// Destroy the calling entity
    pub fn destroy_self(&mut self) {
        self.destroy(self.entity);
    }

    /// Attach a component to the calling entity
    pub fn add_component<C: Component>(&mut self, component: C) {
        self.world
            .commands
            .push(Command::AddComponent(self.entity, Box::new(component)));
    }

    /// Detach a component from the calling entity
    pub fn remove_component(&mut self, component: ComponentId) {
        self.world.commands.push(Command::RemoveComponent(self.entity, component));
    }

    /// Stop both loop clocks
    pub fn stop(&mut self) {
        self.world.commands.push(Command::Stop);
    }

    // Engine services

    /// Engine camera
    pub fn camera(&self) -> Option<&Camera> {
        self.world.camera.as_ref()
    }

    /// Mutable engine camera
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.world.camera.as_mut()
    }

    /// Input state for this frame
    pub fn input(&self) -> &InputManager {
        &self.world.input
    }

    /// HUD text sinks
    pub fn hud_mut(&mut self) -> &mut Hud {
        &mut self.world.hud
    }

    /// Resource loader
    pub fn loader(&self) -> &ResourceLoader {
        &self.world.loader
    }
}
