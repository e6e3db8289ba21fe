//! ECS World implementation
//!
//! The world owns every entity, its components and its physics body, plus
//! the services hooks reach through [`Context`]: timers, the command queue,
//! the camera, input, the HUD and the resource loader.
//!
//! Hooks run with the entity's components temporarily moved out of the
//! entity, so a hook can borrow the world mutably while its own component is
//! borrowed too. Anything structural a hook asks for is queued and applied by
//! [`World::apply_commands`].

use std::time::Duration;

use slotmap::SlotMap;

use crate::assets::ResourceLoader;
use crate::config::EngineConfig;
use crate::ecs::{
    Command, CommandQueue, Component, ComponentId, ComponentKind, Context, Entity, EntityId, TimerTable, Transform,
};
use crate::engine::EngineError;
use crate::foundation::math::{euler_from_quaternion, Vec3};
use crate::input::InputManager;
use crate::physics::{BodyDesc, BodyHandle, PhysicsWorld};
use crate::render::{Camera, FrameSnapshot};
use crate::ui::Hud;

struct ComponentSlot {
    id: ComponentId,
    component: Box<dyn Component>,
}

struct EntityRecord {
    name: String,
    transform: Transform,
    components: Vec<ComponentSlot>,
    body: Option<BodyHandle>,
    pending_body: Option<BodyDesc>,
    live: bool,
}

/// ECS World containing all entities and components
pub struct World {
    entities: SlotMap<EntityId, EntityRecord>,
    owners: SlotMap<ComponentId, EntityId>,
    order: Vec<EntityId>,
    pub(crate) physics: PhysicsWorld,
    pub(crate) timers: TimerTable,
    pub(crate) commands: CommandQueue,
    pub(crate) camera: Option<Camera>,
    pub(crate) input: InputManager,
    pub(crate) hud: Hud,
    pub(crate) loader: ResourceLoader,
    pub(crate) fixed_timestep: f32,
    pub(crate) now: Duration,
    stop_requested: bool,
}

impl World {
    /// Create an empty world
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            entities: SlotMap::with_key(),
            owners: SlotMap::with_key(),
            order: Vec::new(),
            physics: PhysicsWorld::new(&config.physics),
            timers: TimerTable::new(),
            commands: CommandQueue::new(),
            camera: None,
            input: InputManager::new(),
            hud: Hud::new(),
            loader: ResourceLoader::new(config.assets.clone()),
            fixed_timestep: config.loop_rates.fixed_timestep(),
            now: Duration::ZERO,
            stop_requested: false,
        }
    }

    /// Engine time of the current tick
    pub fn now(&self) -> Duration {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    // Entity lifecycle

    /// Make a detached entity live: create its body, then start its components
    pub fn add_game_object(&mut self, entity: Entity) -> EntityId {
        let id = self.insert_detached(entity);
        self.activate(id);
        self.apply_commands();
        id
    }

    /// Destroy an entity; `false` if it was already gone
    ///
    /// Every component gets `on_destroy`, then the components, their timers
    /// and the body are dropped.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let removed = self.destroy_entity(id);
        self.apply_commands();
        removed
    }

    /// Attach a component, starting it at once if the entity is live
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Result<ComponentId, EngineError> {
        self.add_boxed_component(id, Box::new(component))
    }

    /// Attach an already boxed component
    pub fn add_boxed_component(
        &mut self,
        id: EntityId,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, EngineError> {
        let component_id = self.attach(id, component)?;
        self.apply_commands();
        Ok(component_id)
    }

    /// Detach a component without calling `on_destroy`
    ///
    /// Its pending timers are cancelled. Returns the component so the caller
    /// decides what happens to it.
    pub fn remove_component(&mut self, id: EntityId, component: ComponentId) -> Result<Box<dyn Component>, EngineError> {
        if !self.entities.contains_key(id) {
            return Err(EngineError::StaleEntity);
        }
        if self.owners.get(component) != Some(&id) {
            return Err(EngineError::StaleComponent);
        }

        let record = self.entities.get_mut(id).ok_or(EngineError::StaleEntity)?;
        let index = record
            .components
            .iter()
            .position(|slot| slot.id == component)
            .ok_or(EngineError::StaleComponent)?;
        let slot = record.components.remove(index);

        self.owners.remove(component);
        let cancelled = self.timers.purge_component(component);
        log::debug!(
            "Removed {:?} from '{}' ({} timer(s) cancelled)",
            slot.component.kind(),
            record.name,
            cancelled
        );
        Ok(slot.component)
    }

    // Lookup

    /// Whether an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Whether an entity exists and has started
    pub fn is_live(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|record| record.live)
    }

    /// Number of entities, including spawns not yet applied
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities in insertion order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.order.iter().copied()
    }

    /// Entity name
    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.entities.get(id).map(|record| record.name.as_str())
    }

    /// First component of `kind` on an entity
    pub fn get_component(&self, id: EntityId, kind: ComponentKind) -> Option<&dyn Component> {
        self.entities
            .get(id)?
            .components
            .iter()
            .find(|slot| slot.component.kind() == kind)
            .map(|slot| slot.component.as_ref())
    }

    /// Mutable first component of `kind` on an entity
    pub fn get_component_mut(&mut self, id: EntityId, kind: ComponentKind) -> Option<&mut dyn Component> {
        let slot = self
            .entities
            .get_mut(id)?
            .components
            .iter_mut()
            .find(|slot| slot.component.kind() == kind)?;
        Some(slot.component.as_mut())
    }

    /// Component by id
    pub fn component(&self, id: EntityId, component: ComponentId) -> Option<&dyn Component> {
        self.entities
            .get(id)?
            .components
            .iter()
            .find(|slot| slot.id == component)
            .map(|slot| slot.component.as_ref())
    }

    /// Ids of an entity's components, in attach order
    pub fn component_ids(&self, id: EntityId) -> Vec<ComponentId> {
        self.entities
            .get(id)
            .map(|record| record.components.iter().map(|slot| slot.id).collect())
            .unwrap_or_default()
    }

    /// Entity owning a component
    pub fn owner_of(&self, component: ComponentId) -> Option<EntityId> {
        self.owners.get(component).copied()
    }

    // Transform

    /// Copy of an entity transform
    pub fn transform(&self, id: EntityId) -> Option<Transform> {
        self.entities.get(id).map(|record| record.transform)
    }

    /// Move an entity; its body, if any, is teleported to match exactly
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        let Some(record) = self.entities.get_mut(id) else {
            return false;
        };
        record.transform.position = position;
        if let Some(body) = record.body {
            self.physics.teleport(body, position, record.transform.orientation());
        }
        true
    }

    /// Rotate an entity; its body, if any, is teleported to match exactly
    pub fn set_rotation(&mut self, id: EntityId, rotation: Vec3) -> bool {
        let Some(record) = self.entities.get_mut(id) else {
            return false;
        };
        record.transform.rotation = rotation;
        if let Some(body) = record.body {
            self.physics.teleport(body, record.transform.position, record.transform.orientation());
        }
        true
    }

    /// Scale an entity; bodies are not scaled
    pub fn set_scale(&mut self, id: EntityId, scale: Vec3) -> bool {
        let Some(record) = self.entities.get_mut(id) else {
            return false;
        };
        record.transform.scale = scale;
        true
    }

    /// Body attached to an entity
    pub fn body_handle(&self, id: EntityId) -> Option<BodyHandle> {
        self.entities.get(id)?.body
    }

    // Services

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Mutable physics world
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Engine camera
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Mutable engine camera
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Replace the engine camera
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    /// Input state
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Mutable input state, for the host to feed events
    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    /// HUD text sinks
    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Mutable HUD text sinks
    pub fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    /// Resource loader
    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Replace the resource loader
    pub fn set_loader(&mut self, loader: ResourceLoader) {
        self.loader = loader;
    }

    /// Pending timers
    pub fn timers(&self) -> &TimerTable {
        &self.timers
    }

    // Tick passes

    /// Fire every timer due at the current time, in due order
    pub fn fire_timers(&mut self) {
        for timer_id in self.timers.due(self.now) {
            // An earlier callback in this batch may have cancelled it
            let Some(timer) = self.timers.take(timer_id) else {
                continue;
            };
            if !self.is_live(timer.entity) {
                continue;
            }
            self.dispatch(timer.entity, Some(timer.owner), |component, ctx| {
                component.on_timer(ctx, timer.tag);
            });
        }
    }

    /// Run `update` on every live entity, then copy its body pose onto it
    pub fn update(&mut self, dt: f32) {
        for id in self.order.clone() {
            if !self.is_live(id) {
                continue;
            }
            self.dispatch(id, None, |component, ctx| component.update(ctx, dt));
            self.sync_from_body(id);
        }
    }

    /// Run `fixed_update` on every live entity
    pub fn fixed_update(&mut self) {
        for id in self.order.clone() {
            if !self.is_live(id) {
                continue;
            }
            self.dispatch(id, None, |component, ctx| component.fixed_update(ctx));
        }
    }

    /// Apply queued structural changes, including ones queued while applying
    pub fn apply_commands(&mut self) {
        while let Some(command) = self.commands.pop() {
            match command {
                Command::Spawn(id) => self.activate(id),
                Command::Destroy(id) => {
                    self.destroy_entity(id);
                }
                Command::AddComponent(id, component) => {
                    if let Err(e) = self.attach(id, component) {
                        log::warn!("Dropped queued component for {:?}: {}", id, e);
                    }
                }
                Command::RemoveComponent(id, component) => {
                    if let Err(e) = self.remove_component(id, component) {
                        log::warn!("Could not remove component {:?} from {:?}: {}", component, id, e);
                    }
                }
                Command::Stop => self.stop_requested = true,
            }
        }
    }

    /// Whether a hook asked to stop, clearing the request
    pub fn take_stop_request(&mut self) -> bool {
        std::mem::take(&mut self.stop_requested)
    }

    /// Build the frame snapshot from every live entity and the HUD
    pub fn build_snapshot(&self, frame: u64) -> FrameSnapshot {
        let mut snapshot = FrameSnapshot::new(frame, self.now, self.camera.clone());
        for &id in &self.order {
            let Some(record) = self.entities.get(id) else {
                continue;
            };
            if !record.live {
                continue;
            }
            for slot in &record.components {
                slot.component.contribute(id, &record.transform, &mut snapshot);
            }
        }
        snapshot.hud = self
            .hud
            .iter()
            .map(|(sink, text)| (sink.to_string(), text.to_string()))
            .collect();
        snapshot
    }

    // Internals

    /// Insert an entity without starting it
    pub(crate) fn insert_detached(&mut self, entity: Entity) -> EntityId {
        let Entity {
            name,
            transform,
            components,
            body,
        } = entity;

        let id = self.entities.insert(EntityRecord {
            name,
            transform,
            components: Vec::with_capacity(components.len()),
            body: None,
            pending_body: body,
            live: false,
        });

        let slots: Vec<ComponentSlot> = components
            .into_iter()
            .map(|component| ComponentSlot {
                id: self.owners.insert(id),
                component,
            })
            .collect();
        if let Some(record) = self.entities.get_mut(id) {
            record.components = slots;
        }
        self.order.push(id);
        id
    }

    fn activate(&mut self, id: EntityId) {
        let Some(record) = self.entities.get_mut(id) else {
            return;
        };
        if record.live {
            return;
        }
        record.live = true;

        if let Some(desc) = record.pending_body.take() {
            let handle = self
                .physics
                .add_body(&desc, record.transform.position, record.transform.orientation());
            record.body = Some(handle);
        }

        log::debug!(
            "Entity '{}' live with {} component(s){}",
            record.name,
            record.components.len(),
            if record.body.is_some() { " and a body" } else { "" }
        );

        self.start_components(id, None);
    }

    fn attach(&mut self, id: EntityId, component: Box<dyn Component>) -> Result<ComponentId, EngineError> {
        let record = self.entities.get_mut(id).ok_or(EngineError::StaleEntity)?;
        let component_id = self.owners.insert(id);
        record.components.push(ComponentSlot {
            id: component_id,
            component,
        });
        if record.live {
            self.start_components(id, Some(component_id));
        }
        Ok(component_id)
    }

    fn start_components(&mut self, id: EntityId, only: Option<ComponentId>) {
        self.dispatch(id, only, |component, ctx| {
            if let Err(e) = component.start(ctx) {
                log::error!("{:?} on {:?} failed to start: {}", component.kind(), ctx.entity_id(), e);
            }
        });
    }

    fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(id) {
            return false;
        }
        if self.is_live(id) {
            self.dispatch(id, None, |component, ctx| component.on_destroy(ctx));
        }

        let Some(record) = self.entities.remove(id) else {
            return false;
        };
        for slot in &record.components {
            self.owners.remove(slot.id);
        }
        let cancelled = self.timers.purge_entity(id);
        if let Some(body) = record.body {
            self.physics.remove_body(body);
        }
        self.order.retain(|&other| other != id);

        log::debug!("Destroyed '{}' ({} timer(s) cancelled)", record.name, cancelled);
        true
    }

    fn sync_from_body(&mut self, id: EntityId) {
        let Some(record) = self.entities.get_mut(id) else {
            return;
        };
        let Some(body) = record.body.and_then(|handle| self.physics.get(handle)) else {
            return;
        };
        record.transform.position = body.position;
        record.transform.rotation = euler_from_quaternion(&body.orientation);
    }

    fn dispatch<F>(&mut self, id: EntityId, only: Option<ComponentId>, mut hook: F)
    where
        F: FnMut(&mut dyn Component, &mut Context<'_>),
    {
        let Some(record) = self.entities.get_mut(id) else {
            return;
        };
        let mut components = std::mem::take(&mut record.components);

        for slot in &mut components {
            if only.is_some_and(|target| target != slot.id) {
                continue;
            }
            let mut ctx = Context::new(self, id, slot.id);
            hook(slot.component.as_mut(), &mut ctx);
        }

        if let Some(record) = self.entities.get_mut(id) {
            components.append(&mut record.components);
            record.components = components;
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("bodies", &self.physics.len())
            .field("timers", &self.timers.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
